//! Test cases for the construction engine: the dispatch
//! glue, primitives, containers, records, variants and
//! references

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use pretty_assertions::assert_eq;

use super::*;
use crate::{
    error::Category,
    event::{from_events, types::AnchorId},
};

type TestResult = anyhow::Result<()>;

/// Wrap .body in one document
fn doc(body: Vec<StructEvent>) -> Vec<StructEvent>
{
    let mut events = vec![StructEvent::DocStart];
    events.extend(body);
    events.push(StructEvent::DocEnd);

    events
}

/*
 * ==== Primitives ====
 */

#[test]
fn integer_decimal() -> TestResult
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    let mut events = from_events(doc(vec![StructEvent::scalar("-1234", q)]));

    assert_eq!(load::<i32, _>(&mut events, &mut registry)?, -1234);

    Ok(())
}

#[test]
fn integer_leading_plus() -> TestResult
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    let mut events = from_events(doc(vec![StructEvent::scalar("+3", q)]));
    assert_eq!(load::<i32, _>(&mut events, &mut registry)?, 3);

    let mut events = from_events(doc(vec![StructEvent::scalar("+3", q)]));
    assert_eq!(load::<u32, _>(&mut events, &mut registry)?, 3);

    Ok(())
}

#[test]
fn integer_hex_and_octal() -> TestResult
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    let data: &[(&str, u32)] = &[
        ("0xFF", 255),
        ("0X10", 16),
        ("0x_F_F", 255),
        ("0o17", 15),
        ("0O7", 7),
        ("0o1_1", 9),
    ];

    for &(content, expected) in data
    {
        let mut events = from_events(doc(vec![StructEvent::scalar(content, q)]));

        assert_eq!(
            load::<u32, _>(&mut events, &mut registry)?,
            expected,
            "on {:?}",
            content
        );
    }

    Ok(())
}

#[test]
fn integer_hex_overflow_is_an_error()
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    // 0xFF fits an unsigned byte, but not a signed one
    let mut events = from_events(doc(vec![StructEvent::scalar("0xFF", q)]));
    assert_eq!(load::<u8, _>(&mut events, &mut registry).ok(), Some(255));

    let mut events = from_events(doc(vec![StructEvent::scalar("0xFF", q)]));
    let err = load::<i8, _>(&mut events, &mut registry).expect_err("0xFF overflows i8");

    assert_eq!(err.classify(), Category::Construction);
}

#[test]
fn integer_garbage_is_an_error()
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    for content in &["12abc", "0x", "0o8", "", "one"]
    {
        let mut events = from_events(doc(vec![StructEvent::scalar(*content, q)]));

        assert!(
            load::<i64, _>(&mut events, &mut registry).is_err(),
            "expected an error on {:?}",
            content
        );
    }
}

#[test]
fn float_forms() -> TestResult
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    let data: &[(&str, f64)] = &[
        ("3.25", 3.25),
        ("-0.5", -0.5),
        ("42", 42.0),
        ("6.022e23", 6.022e23),
        (".inf", f64::INFINITY),
        ("-.Inf", f64::NEG_INFINITY),
    ];

    for &(content, expected) in data
    {
        let mut events = from_events(doc(vec![StructEvent::scalar(content, q)]));

        assert_eq!(
            load::<f64, _>(&mut events, &mut registry)?,
            expected,
            "on {:?}",
            content
        );
    }

    let mut events = from_events(doc(vec![StructEvent::scalar(".NaN", q)]));
    assert!(load::<f64, _>(&mut events, &mut registry)?.is_nan());

    Ok(())
}

#[test]
fn booleans() -> TestResult
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    for (content, expected) in &[("y", true), ("True", true), ("off", false), ("NO", false)]
    {
        let mut events = from_events(doc(vec![StructEvent::scalar(*content, q)]));

        assert_eq!(
            load::<bool, _>(&mut events, &mut registry)?,
            *expected,
            "on {:?}",
            content
        );
    }

    Ok(())
}

#[test]
fn character_requires_length_one()
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    let mut events = from_events(doc(vec![StructEvent::scalar("é", q)]));
    assert_eq!(load::<char, _>(&mut events, &mut registry).ok(), Some('é'));

    let mut events = from_events(doc(vec![StructEvent::scalar("ab", q)]));
    assert!(load::<char, _>(&mut events, &mut registry).is_err());
}

#[test]
fn strings_copy_content() -> TestResult
{
    let mut registry = TagRegistry::new();
    let s = registry.string();

    let mut events = from_events(doc(vec![StructEvent::scalar("plain text", s)]));

    assert_eq!(
        load::<String, _>(&mut events, &mut registry)?,
        "plain text"
    );

    Ok(())
}

/*
 * ==== Tag and anchor validation ====
 */

#[test]
fn wrong_tag_is_rejected()
{
    let mut registry = TagRegistry::new();
    let other = registry.register_uri("tag:example.com,2000:other");

    let mut events = from_events(doc(vec![StructEvent::scalar("42", other)]));
    let err = load::<i32, _>(&mut events, &mut registry).expect_err("tag mismatch");

    assert_eq!(err.classify(), Category::Construction);
    assert!(
        err.to_string().starts_with("Wrong tag"),
        "unexpected message: {}",
        err
    );
}

#[test]
fn non_specific_tag_is_accepted_for_scalars() -> TestResult
{
    let mut registry = TagRegistry::new();
    let exclamation = registry.exclamation();

    let mut events = from_events(doc(vec![StructEvent::scalar("17", exclamation)]));

    assert_eq!(load::<i32, _>(&mut events, &mut registry)?, 17);

    Ok(())
}

#[test]
fn non_specific_tag_is_rejected_for_sequences()
{
    let mut registry = TagRegistry::new();
    let exclamation = registry.exclamation();
    let q = registry.question();

    let mut events = from_events(doc(vec![
        StructEvent::seq(exclamation),
        StructEvent::scalar("1", q),
        StructEvent::SeqEnd,
    ]));

    let err = load::<Vec<i32>, _>(&mut events, &mut registry).expect_err("'!' on a sequence");

    assert!(err.to_string().starts_with("Wrong tag"));
}

#[test]
fn anchor_on_non_ref_is_rejected()
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    let mut anchored = StructEvent::scalar("5", q);
    anchored.set_anchor(AnchorId::new(1));

    let mut events = from_events(doc(vec![anchored]));
    let err = load::<i32, _>(&mut events, &mut registry).expect_err("anchor on plain int");

    assert_eq!(err.classify(), Category::Construction);
}

/*
 * ==== Containers ====
 */

#[test]
fn sequences() -> TestResult
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    let mut events = from_events(doc(vec![
        StructEvent::seq(q),
        StructEvent::scalar("1", q),
        StructEvent::scalar("2", q),
        StructEvent::scalar("3", q),
        StructEvent::SeqEnd,
    ]));

    assert_eq!(load::<Vec<u8>, _>(&mut events, &mut registry)?, vec![1, 2, 3]);

    Ok(())
}

#[test]
fn fixed_arrays_enforce_length()
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    let body = vec![
        StructEvent::seq(q),
        StructEvent::scalar("1", q),
        StructEvent::scalar("2", q),
        StructEvent::SeqEnd,
    ];

    let mut events = from_events(doc(body.clone()));
    assert_eq!(
        load::<[i32; 2], _>(&mut events, &mut registry).ok(),
        Some([1, 2])
    );

    let mut events = from_events(doc(body));
    let err = load::<[i32; 3], _>(&mut events, &mut registry).expect_err("two of three");

    assert!(err.to_string().contains("3 elements"));
}

#[test]
fn unordered_maps_and_duplicate_keys()
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    let mut events = from_events(doc(vec![
        StructEvent::map(q),
        StructEvent::scalar("a", q),
        StructEvent::scalar("1", q),
        StructEvent::scalar("b", q),
        StructEvent::scalar("2", q),
        StructEvent::MapEnd,
    ]));

    let table: HashMap<String, i32> =
        load(&mut events, &mut registry).expect("a well formed mapping");
    assert_eq!(table.get("a"), Some(&1));
    assert_eq!(table.get("b"), Some(&2));

    let mut events = from_events(doc(vec![
        StructEvent::map(q),
        StructEvent::scalar("a", q),
        StructEvent::scalar("1", q),
        StructEvent::scalar("a", q),
        StructEvent::scalar("2", q),
        StructEvent::MapEnd,
    ]));

    let err = load::<HashMap<String, i32>, _>(&mut events, &mut registry)
        .expect_err("duplicate table key");

    assert_eq!(err.to_string(), "Duplicate table key");
}

#[test]
fn ordered_maps_preserve_entry_order() -> TestResult
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    let mut body = vec![StructEvent::seq(q)];
    for (k, v) in &[("z", "26"), ("a", "1"), ("m", "13")]
    {
        body.push(StructEvent::map(q));
        body.push(StructEvent::scalar(*k, q));
        body.push(StructEvent::scalar(*v, q));
        body.push(StructEvent::MapEnd);
    }
    body.push(StructEvent::SeqEnd);

    let mut events = from_events(doc(body));
    let pairs: Pairs<String, i32> = load(&mut events, &mut registry)?;

    let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["z", "a", "m"], "entry order must survive");

    Ok(())
}

#[test]
fn options_construct_nulls() -> TestResult
{
    let mut registry = TagRegistry::new();
    let q = registry.question();
    let null_string = registry.null_string();

    let mut events = from_events(doc(vec![StructEvent::scalar("", q)]));
    assert_eq!(load::<Option<i32>, _>(&mut events, &mut registry)?, None);

    let mut events = from_events(doc(vec![StructEvent::scalar("~", q)]));
    assert_eq!(load::<Option<i32>, _>(&mut events, &mut registry)?, None);

    let mut events = from_events(doc(vec![StructEvent::scalar("7", q)]));
    assert_eq!(load::<Option<i32>, _>(&mut events, &mut registry)?, Some(7));

    // The null string sentinel nulls a nullable string
    let mut events = from_events(doc(vec![StructEvent::scalar("", null_string)]));
    assert_eq!(load::<Option<String>, _>(&mut events, &mut registry)?, None);

    Ok(())
}

/*
 * ==== Records ====
 */

#[derive(Debug, PartialEq, Default)]
struct Monster
{
    level:      i32,
    experience: u32,
    drops:      Vec<String>,
}

impl Construct for Monster
{
    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.register_uri("tag:yatl.dev,2025:test:Monster")
    }

    fn construct<I>(
        events: &mut Events<I>,
        ctx: &mut ConstructionContext,
        registry: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        expect_map_start(events)?;

        let mut fields = FieldSet::new(&["level", "experience", "drops"]);
        let mut level: Option<i32> = None;
        let mut experience: Option<u32> = None;
        let mut drops: Option<Vec<String>> = None;

        while let Some(key) = next_key(events)?
        {
            match fields.claim(&key)?
            {
                0 => level = Some(i32::construct_child(events, ctx, registry)?),
                1 => experience = Some(u32::construct_child(events, ctx, registry)?),
                2 => drops = Some(Vec::construct_child(events, ctx, registry)?),
                _ => unreachable!(),
            }
        }

        fields.finish()?;

        Ok(Monster {
            level:      level.ok_or_else(|| missing_field_error("level"))?,
            experience: experience.ok_or_else(|| missing_field_error("experience"))?,
            drops:      drops.ok_or_else(|| missing_field_error("drops"))?,
        })
    }
}

fn monster_body(registry: &mut TagRegistry) -> Vec<StructEvent>
{
    let q = registry.question();

    vec![
        StructEvent::map(q),
        StructEvent::scalar("level", q),
        StructEvent::scalar("42", q),
        StructEvent::scalar("experience", q),
        StructEvent::scalar("1800", q),
        StructEvent::scalar("drops", q),
        StructEvent::seq(q),
        StructEvent::scalar("Sword", q),
        StructEvent::SeqEnd,
        StructEvent::MapEnd,
    ]
}

#[test]
fn record_construction() -> TestResult
{
    let mut registry = TagRegistry::new();
    let body = monster_body(&mut registry);

    let mut events = from_events(doc(body));
    let monster: Monster = load(&mut events, &mut registry)?;

    assert_eq!(
        monster,
        Monster {
            level:      42,
            experience: 1800,
            drops:      vec!["Sword".to_owned()],
        }
    );

    Ok(())
}

#[test]
fn record_missing_field()
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    let mut events = from_events(doc(vec![
        StructEvent::map(q),
        StructEvent::scalar("level", q),
        StructEvent::scalar("42", q),
        StructEvent::scalar("drops", q),
        StructEvent::seq(q),
        StructEvent::SeqEnd,
        StructEvent::MapEnd,
    ]));

    let err = load::<Monster, _>(&mut events, &mut registry).expect_err("experience absent");

    assert_eq!(err.to_string(), "Missing field: experience");
}

#[test]
fn record_duplicate_field()
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    let mut events = from_events(doc(vec![
        StructEvent::map(q),
        StructEvent::scalar("level", q),
        StructEvent::scalar("42", q),
        StructEvent::scalar("level", q),
        StructEvent::scalar("43", q),
        StructEvent::MapEnd,
    ]));

    let err = load::<Monster, _>(&mut events, &mut registry).expect_err("level doubled");

    assert_eq!(err.to_string(), "Duplicate field: level");
}

#[test]
fn record_unknown_field()
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    let mut events = from_events(doc(vec![
        StructEvent::map(q),
        StructEvent::scalar("mana", q),
        StructEvent::scalar("99", q),
        StructEvent::MapEnd,
    ]));

    let err = load::<Monster, _>(&mut events, &mut registry).expect_err("no such field");

    assert_eq!(err.to_string(), "Unknown field: mana");
}

#[test]
fn record_with_explicit_tag() -> TestResult
{
    let mut registry = TagRegistry::new();
    let tag = Monster::tag(&mut registry);
    let mut body = monster_body(&mut registry);
    body[0] = StructEvent::map(tag);

    let mut events = from_events(doc(body));
    let monster: Monster = load(&mut events, &mut registry)?;

    assert_eq!(monster.level, 42);

    Ok(())
}

/*
 * ==== Variant records ====
 */

#[derive(Debug, PartialEq)]
enum Shape
{
    Circle
    {
        radius: f64
    },
    Rect
    {
        width: f64, height: f64
    },
}

impl Construct for Shape
{
    const ALLOW_NON_SPECIFIC: bool = false;

    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.register_uri("tag:yatl.dev,2025:test:Shape")
    }

    fn construct<I>(
        events: &mut Events<I>,
        ctx: &mut ConstructionContext,
        registry: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        variant_begin(events)?;

        // The discriminator must come first, so branch
        // fields can be validated against its value
        let key = match variant_next(events)?
        {
            Some(key) => key,
            None => return Err(missing_field_error("kind")),
        };

        if key != "kind"
        {
            return Err(missing_field_error("kind"));
        }

        let kind = String::construct_child(events, ctx, registry)?;
        variant_end_field(events)?;

        match kind.as_str()
        {
            "circle" =>
            {
                let mut radius: Option<f64> = None;

                while let Some(field) = variant_next(events)?
                {
                    match field.as_str()
                    {
                        "radius" if radius.is_none() =>
                        {
                            radius = Some(f64::construct_child(events, ctx, registry)?)
                        },
                        "radius" => return Err(duplicate_field_error("radius")),
                        _ => return Err(field_not_allowed_error(&field, "kind", "circle")),
                    }

                    variant_end_field(events)?;
                }

                Ok(Shape::Circle {
                    radius: radius.ok_or_else(|| missing_field_error("radius"))?,
                })
            },
            "rect" =>
            {
                let mut width: Option<f64> = None;
                let mut height: Option<f64> = None;

                while let Some(field) = variant_next(events)?
                {
                    match field.as_str()
                    {
                        "width" if width.is_none() =>
                        {
                            width = Some(f64::construct_child(events, ctx, registry)?)
                        },
                        "height" if height.is_none() =>
                        {
                            height = Some(f64::construct_child(events, ctx, registry)?)
                        },
                        "width" => return Err(duplicate_field_error("width")),
                        "height" => return Err(duplicate_field_error("height")),
                        _ => return Err(field_not_allowed_error(&field, "kind", "rect")),
                    }

                    variant_end_field(events)?;
                }

                Ok(Shape::Rect {
                    width:  width.ok_or_else(|| missing_field_error("width"))?,
                    height: height.ok_or_else(|| missing_field_error("height"))?,
                })
            },
            _ => Err(malformed_scalar_error("shape kind", kind)),
        }
    }
}

fn shape_field(registry: &mut TagRegistry, name: &str, value: &str) -> Vec<StructEvent>
{
    let q = registry.question();

    vec![
        StructEvent::map(q),
        StructEvent::scalar(name, q),
        StructEvent::scalar(value, q),
        StructEvent::MapEnd,
    ]
}

#[test]
fn variant_record_construction() -> TestResult
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    let mut body = vec![StructEvent::seq(q)];
    body.extend(shape_field(&mut registry, "kind", "rect"));
    body.extend(shape_field(&mut registry, "width", "4.0"));
    body.extend(shape_field(&mut registry, "height", "2.5"));
    body.push(StructEvent::SeqEnd);

    let mut events = from_events(doc(body));
    let shape: Shape = load(&mut events, &mut registry)?;

    assert_eq!(
        shape,
        Shape::Rect {
            width:  4.0,
            height: 2.5,
        }
    );

    Ok(())
}

#[test]
fn variant_record_rejects_foreign_branch_fields()
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    let mut body = vec![StructEvent::seq(q)];
    body.extend(shape_field(&mut registry, "kind", "circle"));
    body.extend(shape_field(&mut registry, "width", "4.0"));
    body.push(StructEvent::SeqEnd);

    let mut events = from_events(doc(body));
    let err = load::<Shape, _>(&mut events, &mut registry).expect_err("width is not circular");

    assert_eq!(err.to_string(), "Field width is not allowed for kind == circle");
}

/*
 * ==== Implicit variants ====
 */

#[derive(Debug, PartialEq)]
enum Setting
{
    Number(i64),
    Text(String),
    Flag(bool),
    Empty,
}

impl Construct for Setting
{
    const IMPLICIT_VARIANT: bool = true;

    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.register_uri("tag:yatl.dev,2025:test:Setting")
    }

    fn construct<I>(
        _: &mut Events<I>,
        _: &mut ConstructionContext,
        _: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        // Reached only by bypassing the engine glue
        Err(InternalError::new(ErrorCode::CorruptStream).into())
    }

    fn construct_implicit<I>(
        possible: &[TagId],
        events: &mut Events<I>,
        ctx: &mut ConstructionContext,
        registry: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        if possible.contains(&i64::tag(registry))
        {
            return i64::construct_child(events, ctx, registry).map(Setting::Number);
        }

        if possible.contains(&String::tag(registry))
        {
            return String::construct_child(events, ctx, registry).map(Setting::Text);
        }

        if possible.contains(&bool::tag(registry))
        {
            return bool::construct_child(events, ctx, registry).map(Setting::Flag);
        }

        // Branches without a payload match only null
        if possible.contains(&registry.null())
        {
            events.next()?;

            return Ok(Setting::Empty);
        }

        let uri = possible
            .first()
            .map(|id| registry.uri(*id).to_owned())
            .unwrap_or_default();

        Err(no_variant_match_error("Setting", &uri))
    }
}

#[test]
fn implicit_variant_dispatch() -> TestResult
{
    let mut registry = TagRegistry::new();
    let q = registry.question();
    let s = registry.string();

    let data: &[(StructEvent, Setting)] = &[
        (StructEvent::scalar("42", q), Setting::Number(42)),
        (StructEvent::scalar("-7", q), Setting::Number(-7)),
        (StructEvent::scalar("word", q), Setting::Text("word".into())),
        (StructEvent::scalar("true", q), Setting::Flag(true)),
        (StructEvent::scalar("", q), Setting::Empty),
        (StructEvent::scalar("yes", s), Setting::Text("yes".into())),
    ];

    for (event, expected) in data
    {
        let mut events = from_events(doc(vec![event.clone()]));
        let setting: Setting = load(&mut events, &mut registry)?;

        assert_eq!(&setting, expected, "on {:?}", event);
    }

    Ok(())
}

#[test]
fn implicit_variant_rejects_unmatched_tags()
{
    let mut registry = TagRegistry::new();
    let other = registry.register_uri("tag:example.com,2000:pair");

    let mut events = from_events(doc(vec![StructEvent::scalar("x", other)]));
    let err = load::<Setting, _>(&mut events, &mut registry).expect_err("no branch for it");

    assert!(
        err.to_string()
            .starts_with("This value type does not map to any field in Setting"),
        "unexpected message: {}",
        err
    );
}

#[test]
fn implicit_variant_rejects_untagged_complex_values()
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    let mut events = from_events(doc(vec![
        StructEvent::map(q),
        StructEvent::MapEnd,
    ]));

    let err = load::<Setting, _>(&mut events, &mut registry).expect_err("untagged mapping");

    assert_eq!(err.to_string(), "Complex mapping value must have a tag");
}

/*
 * ==== References ====
 */

#[derive(Debug, Default)]
struct Node
{
    value: i32,
    next:  Option<Rc<RefCell<Node>>>,
}

impl Construct for Node
{
    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.register_uri("tag:yatl.dev,2025:test:Node")
    }

    fn construct<I>(
        events: &mut Events<I>,
        ctx: &mut ConstructionContext,
        registry: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        expect_map_start(events)?;

        let mut fields = FieldSet::new(&["value", "next"]);
        let mut value: Option<i32> = None;
        let mut next: Option<Option<Rc<RefCell<Node>>>> = None;

        while let Some(key) = next_key(events)?
        {
            match fields.claim(&key)?
            {
                0 => value = Some(i32::construct_child(events, ctx, registry)?),
                1 => next = Some(Option::construct_child(events, ctx, registry)?),
                _ => unreachable!(),
            }
        }

        fields.finish()?;

        Ok(Node {
            value: value.ok_or_else(|| missing_field_error("value"))?,
            next:  next.ok_or_else(|| missing_field_error("next"))?,
        })
    }
}

#[test]
fn aliases_resolve_to_the_same_object() -> TestResult
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    // &a {x: 1}
    // --- *a
    let mut anchored = StructEvent::map(q);
    anchored.set_anchor(AnchorId::new(1));

    let mut events = from_events(vec![
        StructEvent::DocStart,
        anchored,
        StructEvent::scalar("x", q),
        StructEvent::scalar("1", q),
        StructEvent::MapEnd,
        StructEvent::DocEnd,
        StructEvent::DocStart,
        StructEvent::Alias {
            target: AnchorId::new(1),
        },
        StructEvent::DocEnd,
    ]);

    let docs: Vec<Rc<RefCell<HashMap<String, i32>>>> = load_multi(&mut events, &mut registry)?;

    assert_eq!(docs.len(), 2);
    assert!(
        Rc::ptr_eq(&docs[0], &docs[1]),
        "both documents must resolve to one object"
    );
    assert_eq!(docs[0].borrow().get("x"), Some(&1));

    Ok(())
}

#[test]
fn cycles_resolve_through_anchors() -> TestResult
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    // &a {value: 1, next: *a}
    let mut anchored = StructEvent::map(q);
    anchored.set_anchor(AnchorId::new(1));

    let mut events = from_events(doc(vec![
        anchored,
        StructEvent::scalar("value", q),
        StructEvent::scalar("1", q),
        StructEvent::scalar("next", q),
        StructEvent::Alias {
            target: AnchorId::new(1),
        },
        StructEvent::MapEnd,
    ]));

    let root: Rc<RefCell<Node>> = load(&mut events, &mut registry)?;

    let next = root.borrow().next.clone().expect("the cycle edge");
    assert!(Rc::ptr_eq(&root, &next), "the node must point at itself");
    assert_eq!(root.borrow().value, 1);

    Ok(())
}

#[test]
fn unknown_alias_is_an_error()
{
    let mut registry = TagRegistry::new();

    let mut events = from_events(doc(vec![StructEvent::Alias {
        target: AnchorId::new(9),
    }]));

    let err = load::<Rc<RefCell<Node>>, _>(&mut events, &mut registry)
        .expect_err("nothing was anchored");

    assert_eq!(err.classify(), Category::Construction);
}

#[test]
fn alias_into_non_ref_is_an_error()
{
    let mut registry = TagRegistry::new();

    let mut events = from_events(doc(vec![StructEvent::Alias {
        target: AnchorId::new(1),
    }]));

    let err = load::<i32, _>(&mut events, &mut registry).expect_err("ints are not references");

    assert_eq!(err.classify(), Category::Construction);
}

/*
 * ==== Stream handling ====
 */

#[test]
fn load_multi_reads_every_document() -> TestResult
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    let mut events = from_events(vec![
        StructEvent::StreamStart,
        StructEvent::DocStart,
        StructEvent::scalar("1", q),
        StructEvent::DocEnd,
        StructEvent::DocStart,
        StructEvent::scalar("2", q),
        StructEvent::DocEnd,
        StructEvent::StreamEnd,
    ]);

    assert_eq!(load_multi::<i32, _>(&mut events, &mut registry)?, vec![1, 2]);
    assert!(events.finished());

    Ok(())
}

#[test]
fn truncated_stream_is_eof()
{
    let mut registry = TagRegistry::new();
    let q = registry.question();

    let mut events = from_events(vec![
        StructEvent::DocStart,
        StructEvent::seq(q),
        StructEvent::scalar("1", q),
        // SeqEnd and DocEnd never arrive
    ]);

    let err = load::<Vec<i32>, _>(&mut events, &mut registry).expect_err("truncated");

    assert_eq!(err.classify(), Category::EOF);
}
