//! Test cases for anchors and aliases

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn anchor_then_alias()
{
    let mut l = lexer("&anchor value\n*anchor\n");

    events!(l =>
        | LineStart, 0, "",
        | Anchor, 0, "anchor"   => "expected an anchor",
        | Scalar, 8, "value",
        | LineStart, 0, "",
        | Alias, 0, "anchor"    => "expected an alias",
        | StreamEnd, 0, ""
    );
}

#[test]
fn anchor_name_characters()
{
    let mut l = lexer("&a1-b_c x");

    events!(l =>
        | LineStart, 0, "",
        | Anchor, 0, "a1-b_c",
        | Scalar, 8, "x",
        | StreamEnd, 9, ""
    );
}

#[test]
fn missing_anchor_name()
{
    let mut l = lexer("& x");

    events!(l =>
        | LineStart, 0, "",
        | Error, 1, "Invalid anchor name",
        | Scalar, 2, "x",
        | StreamEnd, 3, ""
    );
}

#[test]
fn aliases_in_flow()
{
    let mut l = lexer("[*a, *b]");

    events!(l =>
        | LineStart, 0, "",
        | ControlChar, 0, "[",
        | Alias, 1, "a",
        | ControlChar, 3, ",",
        | Alias, 5, "b",
        | ControlChar, 7, "]",
        | StreamEnd, 8, ""
    );
}

#[test]
fn anchored_mapping_value()
{
    let mut l = lexer("a: &val 1\nb: *val\n");

    events!(l =>
        | LineStart, 0, "",
        | Scalar, 0, "a",
        | ControlChar, 1, ":",
        | Anchor, 3, "val",
        | Scalar, 8, "1",
        | LineStart, 0, "",
        | Scalar, 0, "b",
        | ControlChar, 1, ":",
        | Alias, 3, "val",
        | StreamEnd, 0, ""
    );
}
