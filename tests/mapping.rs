//! Integration tests for the object mapper and the derive macro

#![allow(clippy::expect_used, clippy::unwrap_used)]

use hyper_tag::error::constants::{ERR_ABSENT_VALUE, ERR_NO_DISPATCH_RULE};
use hyper_tag::mapping::{MappingContext, TagConverter};
use hyper_tag::{
    decode, encode, ErrorMode, MappingOptions, Nesting, Result, Tag, TagError, TagKind, TagMapped,
    TagMapper, TagStruct, TypeRegistry, DEFAULT_MAPPING_DEPTH, DEFAULT_MAX_DEPTH,
};
use std::sync::Arc;

#[derive(TagMapped, Default, Debug, Clone, PartialEq)]
struct Person {
    #[tag(rename = "Number")]
    number: i32,
    #[tag(rename = "Text")]
    text: String,
}

#[derive(TagMapped, Default, Debug, Clone, PartialEq)]
struct Team {
    name: String,
    lead: Person,
    members: Vec<Person>,
    scores: Vec<i32>,
    nickname: Option<String>,
    #[tag(skip)]
    cached_size: usize,
}

#[derive(TagMapped, Default, Debug, PartialEq)]
struct Node {
    value: i32,
    next: Option<Box<Node>>,
}

#[derive(TagMapped, Default, Debug, PartialEq)]
struct Roster {
    people: Vec<Option<Person>>,
}

#[derive(TagMapped, Default, Debug, PartialEq)]
#[tag(self_describing)]
struct Rgb(u8, u8, u8);

impl TagStruct for Rgb {
    fn write_tag(&self) -> Result<Tag> {
        Ok(Tag::blob(vec![self.0, self.1, self.2]))
    }

    fn read_tag(&mut self, tag: &Tag) -> Result<()> {
        match tag.as_blob() {
            Some(&[r, g, b]) => {
                *self = Rgb(r, g, b);
                Ok(())
            }
            _ => Err(TagError::mapping("An RGB colour is three bytes")),
        }
    }
}

#[derive(TagMapped, Default, Debug, PartialEq)]
#[tag(registered)]
struct Cents(i64);

struct CentsAsDecimalString;

impl TagConverter<Cents> for CentsAsDecimalString {
    fn to_tag(&self, value: &Cents, _ctx: &MappingContext<'_>) -> Result<Tag> {
        Ok(Tag::from(format!("{}.{:02}", value.0 / 100, value.0 % 100)))
    }

    fn from_tag(&self, tag: &Tag, _ctx: &MappingContext<'_>) -> Result<Cents> {
        tag.as_str()
            .map(|s| s.replace('.', ""))
            .and_then(|s| s.parse().ok())
            .map(Cents)
            .ok_or_else(|| TagError::mapping("Not an amount"))
    }
}

fn mapper() -> TagMapper {
    TagMapper::with_registry(Arc::new(TypeRegistry::new())).with_options(MappingOptions::raising())
}

fn node_chain(levels: i32) -> Node {
    let mut head = Node::default();
    for value in 1..levels {
        head = Node {
            value,
            next: Some(Box::new(head)),
        };
    }
    head
}

/// The tree a `levels`-long `Node` chain maps to, built without the mapper
fn node_chain_tag(levels: i32) -> Tag {
    let mut tag = Tag::absent();
    for value in 0..levels {
        tag = Tag::container()
            .with_entity(Tag::named("value", Tag::from(value)))
            .with_entity(Tag::named("next", tag));
    }
    tag
}

fn sample_roster() -> Roster {
    Roster {
        people: vec![
            Some(Person {
                number: 1,
                text: "first".into(),
            }),
            None,
            Some(Person {
                number: 3,
                text: "third".into(),
            }),
        ],
    }
}

fn sample_team() -> Team {
    Team {
        name: "core".into(),
        lead: Person {
            number: 1,
            text: "lead".into(),
        },
        members: vec![
            Person {
                number: 2,
                text: "a".into(),
            },
            Person {
                number: 3,
                text: "b".into(),
            },
        ],
        scores: vec![10, 20, 30],
        nickname: None,
        cached_size: 0,
    }
}

#[test]
fn test_person_tree_shape() {
    let person = Person {
        number: 42,
        text: "Hello".into(),
    };
    let tag = mapper().serialize(&person).unwrap().unwrap();

    assert!(tag.is_container());
    assert_eq!(tag.len(), 2);
    assert_eq!(tag.entities()[0].as_str(), Some("Number"));
    assert_eq!(tag.entities()[0].first_entity().and_then(Tag::as_i32), Some(42));
    assert_eq!(tag.entities()[1].as_str(), Some("Text"));
    assert_eq!(tag.entities()[1].first_entity().and_then(Tag::as_str), Some("Hello"));
}

#[test]
fn test_person_through_bytes() {
    let person = Person {
        number: 42,
        text: "Hello".into(),
    };
    let mapper = mapper();
    let bytes = mapper.serialize_to_bytes(&person).unwrap().unwrap();
    let back: Person = mapper.deserialize_from_bytes(&bytes).unwrap().unwrap();
    assert_eq!(back, person);
}

#[test]
fn test_corrupted_member_kind_raises_mapping_error() {
    let mapper = mapper();
    let person = Person {
        number: 42,
        text: "Hello".into(),
    };
    let mut tag = mapper.serialize(&person).unwrap().unwrap();
    tag.entities_mut()[1].entities_mut()[0] = Tag::from(7i32);

    let err = mapper.deserialize::<Person>(&tag).unwrap_err();
    assert!(matches!(err, TagError::Mapping(_)));

    // The same failure is swallowed in suppress mode
    let quiet = mapper.with_options(MappingOptions::default().with_error_mode(ErrorMode::Suppress));
    assert_eq!(quiet.deserialize::<Person>(&tag).unwrap(), None);
}

#[test]
fn test_nested_aggregates_roundtrip() {
    let mapper = mapper();
    let team = sample_team();
    let tag = mapper.serialize(&team).unwrap().unwrap();

    // Skipped members are never written
    assert_eq!(tag.len(), 5);
    let scores = &tag.entities()[3];
    assert_eq!(scores.as_str(), Some("scores"));
    assert_eq!(scores.first_entity().map(Tag::kind), Some(TagKind::IntArray));
    assert!(tag.entities()[4].first_entity().is_some_and(Tag::is_absent));

    assert_eq!(mapper.deserialize::<Team>(&tag).unwrap(), Some(team));
}

#[test]
fn test_skipped_member_reads_as_default() {
    let mapper = mapper();
    let mut team = sample_team();
    team.cached_size = 99;
    let tag = mapper.serialize(&team).unwrap().unwrap();
    let back = mapper.deserialize::<Team>(&tag).unwrap().unwrap();
    assert_eq!(back.cached_size, 0);
    assert_eq!(back.members, team.members);
}

#[test]
fn test_unknown_and_malformed_members_are_ignored() {
    let tag = Tag::container()
        .with_entity(Tag::named("Extra", Tag::from(1.5f64)))
        .with_entity(Tag::from(3i32))
        .with_entity(Tag::from("dangling name"))
        .with_entity(Tag::named("Number", Tag::from(9i32)));

    let person = mapper().deserialize::<Person>(&tag).unwrap().unwrap();
    assert_eq!(
        person,
        Person {
            number: 9,
            text: String::new()
        }
    );
}

#[test]
fn test_absent_member_into_required_field() {
    let tag = Tag::container().with_entity(Tag::named("Number", Tag::absent()));
    let err = mapper().deserialize::<Person>(&tag).unwrap_err();
    assert!(err.to_string().contains(ERR_ABSENT_VALUE));
}

#[test]
fn test_boxed_nesting() {
    let boxed = mapper().with_options(MappingOptions::raising().with_nesting(Nesting::Boxed));
    let team = sample_team();
    let tag = boxed.serialize(&team).unwrap().unwrap();

    let lead = tag.entities()[1].first_entity().unwrap();
    assert_eq!(lead.kind(), TagKind::Blob);
    // Arrays and absent values are never boxed
    assert_eq!(tag.entities()[3].first_entity().unwrap().kind(), TagKind::IntArray);
    assert!(tag.entities()[4].first_entity().unwrap().is_absent());

    assert_eq!(boxed.deserialize::<Team>(&tag).unwrap(), Some(team.clone()));

    // An embedded tree is not readable in boxed mode
    let embedded = mapper().serialize(&team).unwrap().unwrap();
    assert!(boxed.deserialize::<Team>(&embedded).unwrap_err().is_mapping());
}

#[test]
fn test_recursive_type_hits_depth_limit() {
    let mut head = Node::default();
    for value in 1..=40 {
        head = Node {
            value,
            next: Some(Box::new(head)),
        };
    }

    let shallow = mapper().with_options(MappingOptions::raising().with_max_depth(16));
    let err = shallow.serialize(&head).unwrap_err();
    assert!(err.is_recursion());

    let deep = mapper().with_options(MappingOptions::raising().with_max_depth(64));
    let tag = deep.serialize(&head).unwrap().unwrap();
    assert_eq!(deep.deserialize::<Node>(&tag).unwrap(), Some(head));
    assert!(shallow.deserialize::<Node>(&tag).unwrap_err().is_recursion());
}

#[test]
fn test_self_describing_type() {
    let mapper = mapper();
    let tag = mapper.serialize(&Rgb(1, 2, 3)).unwrap().unwrap();
    assert_eq!(tag.as_blob(), Some(&[1u8, 2, 3][..]));
    assert_eq!(mapper.deserialize::<Rgb>(&tag).unwrap(), Some(Rgb(1, 2, 3)));

    let err = mapper.deserialize::<Rgb>(&Tag::blob(vec![1])).unwrap_err();
    assert!(err.is_mapping());
}

#[test]
fn test_registered_only_type() {
    let registry = Arc::new(TypeRegistry::new());
    let mapper = TagMapper::with_registry(Arc::clone(&registry)).with_options(MappingOptions::raising());

    let err = mapper.serialize(&Cents(1999)).unwrap_err();
    assert!(err.to_string().contains(ERR_NO_DISPATCH_RULE));

    registry.register::<Cents, _>(CentsAsDecimalString);
    let tag = mapper.serialize(&Cents(1999)).unwrap().unwrap();
    assert_eq!(tag.as_str(), Some("19.99"));
    assert_eq!(mapper.deserialize::<Cents>(&tag).unwrap(), Some(Cents(1999)));
}

#[test]
fn test_registered_converter_overrides_aggregate() {
    struct PersonAsString;

    impl TagConverter<Person> for PersonAsString {
        fn to_tag(&self, value: &Person, _ctx: &MappingContext<'_>) -> Result<Tag> {
            Ok(Tag::from(format!("{}:{}", value.number, value.text)))
        }

        fn from_tag(&self, tag: &Tag, _ctx: &MappingContext<'_>) -> Result<Person> {
            let (number, text) = tag
                .as_str()
                .and_then(|s| s.split_once(':'))
                .ok_or_else(|| TagError::mapping("Not a person"))?;
            Ok(Person {
                number: number.parse().map_err(|_| TagError::mapping("Bad number"))?,
                text: text.to_string(),
            })
        }
    }

    let registry = Arc::new(TypeRegistry::new());
    registry.register::<Person, _>(PersonAsString);
    let mapper = TagMapper::with_registry(registry).with_options(MappingOptions::raising());

    let team = sample_team();
    let tag = mapper.serialize(&team).unwrap().unwrap();
    assert_eq!(tag.entities()[1].first_entity().and_then(Tag::as_str), Some("1:lead"));
    assert_eq!(mapper.deserialize::<Team>(&tag).unwrap(), Some(team));
}

#[test]
fn test_free_functions_use_defaults() {
    let person = Person {
        number: 5,
        text: "five".into(),
    };
    let tag = hyper_tag::mapping::to_tag(&person).unwrap().unwrap();
    assert_eq!(hyper_tag::mapping::from_tag::<Person>(&tag).unwrap(), Some(person));
}

#[test]
fn test_absent_aggregate_elements_keep_their_index() {
    let mapper = mapper();
    let roster = sample_roster();
    let tag = mapper.serialize(&roster).unwrap().unwrap();

    let people = tag.entities()[0].first_entity().unwrap();
    assert_eq!(people.len(), 3);
    assert_eq!(people.entities()[0].kind(), TagKind::Container);
    assert!(people.entities()[1].is_absent());
    assert_eq!(people.entities()[2].kind(), TagKind::Container);

    let back = mapper.deserialize::<Roster>(&tag).unwrap().unwrap();
    assert_eq!(back.people[1], None);
    assert_eq!(back, roster);
}

#[test]
fn test_absent_aggregate_elements_keep_their_index_when_boxed() {
    let boxed = mapper().with_options(MappingOptions::raising().with_nesting(Nesting::Boxed));
    let roster = sample_roster();
    let tag = boxed.serialize(&roster).unwrap().unwrap();

    let member = tag.entities()[0].first_entity().unwrap();
    assert_eq!(member.kind(), TagKind::Blob);
    let people = decode(member.as_blob().unwrap(), DEFAULT_MAX_DEPTH).unwrap();
    assert_eq!(people.len(), 3);
    assert_eq!(people.entities()[0].kind(), TagKind::Blob);
    assert!(people.entities()[1].is_absent());
    assert_eq!(people.entities()[2].kind(), TagKind::Blob);

    let back = boxed.deserialize::<Roster>(&tag).unwrap().unwrap();
    assert_eq!(back.people[1], None);
    assert_eq!(back, roster);
}

#[test]
fn test_deep_chain_stops_at_default_mapping_depth() {
    let tag = node_chain_tag(1000);
    assert_eq!(tag.depth(), 2001);

    let raising = mapper();
    assert_eq!(raising.options().max_depth, DEFAULT_MAPPING_DEPTH);
    assert!(raising.deserialize::<Node>(&tag).unwrap_err().is_recursion());

    let quiet = TagMapper::new().with_options(MappingOptions::default().with_error_mode(ErrorMode::Suppress));
    assert_eq!(quiet.deserialize::<Node>(&tag).unwrap(), None);

    // The codec accepts the stream, the mapper's tree limit does not
    let bytes = encode(&tag, DEFAULT_MAX_DEPTH).unwrap();
    assert!(raising.deserialize_from_bytes::<Node>(&bytes).unwrap_err().is_recursion());

    let head = node_chain(1000);
    assert!(raising.serialize(&head).unwrap_err().is_recursion());
    assert!(raising.serialize_to_bytes(&head).unwrap_err().is_recursion());
}

#[test]
fn test_chain_within_mapping_depth_roundtrips_through_bytes() {
    let mapper = mapper();
    let head = node_chain(200);

    let bytes = mapper.serialize_to_bytes(&head).unwrap().unwrap();
    let tree = decode(&bytes, DEFAULT_MAX_DEPTH).unwrap();
    assert_eq!(tree.depth(), 401);
    assert!(tree == node_chain_tag(200));

    assert_eq!(mapper.deserialize_from_bytes::<Node>(&bytes).unwrap(), Some(head));
}
