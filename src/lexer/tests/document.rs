//! Test cases for document markers and dash/dot run
//! disambiguation

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn directives_end_then_document_end()
{
    let mut l = lexer("---\n...\n");

    events!(l =>
        | DirectivesEnd, 0, "---"   => "expected the directives end marker",
        | LineStart, 0, ""          => "expected a line start inside the document",
        | DocumentEnd, 0, "..."     => "expected the document end marker",
        | StreamEnd, 0, ""          => "expected end of stream"
    );
}

#[test]
fn directives_end_with_content()
{
    let mut l = lexer("--- a\n");

    events!(l =>
        | DirectivesEnd, 0, "---",
        | Scalar, 4, "a",
        | StreamEnd, 0, ""
    );
}

#[test]
fn marker_between_documents()
{
    let mut l = lexer("a\n---\nb\n");

    events!(l =>
        | LineStart, 0, "",
        | Scalar, 0, "a",
        | LineStart, 0, "",
        | DirectivesEnd, 0, "---",
        | LineStart, 0, "",
        | Scalar, 0, "b",
        | StreamEnd, 0, ""
    );
}

#[test]
fn two_dashes_are_a_scalar()
{
    let mut l = lexer("--x\n");

    events!(l =>
        | LineStart, 0, "",
        | Scalar, 0, "--x" => "a dash run that is not exactly three is content",
        | StreamEnd, 0, ""
    );
}

#[test]
fn four_dashes_are_a_scalar()
{
    let mut l = lexer("----\n");

    events!(l =>
        | LineStart, 0, "",
        | Scalar, 0, "----",
        | StreamEnd, 0, ""
    );
}

#[test]
fn three_dashes_with_content_are_a_scalar()
{
    let mut l = lexer("---x\n");

    events!(l =>
        | LineStart, 0, "",
        | Scalar, 0, "---x" => "the run is judged at the first non-matching character",
        | StreamEnd, 0, ""
    );
}

#[test]
fn single_dash_is_a_block_entry()
{
    let mut l = lexer("- a\n- b\n");

    events!(l =>
        | LineStart, 0, "",
        | ControlChar, 0, "-",
        | Scalar, 2, "a",
        | LineStart, 0, "",
        | ControlChar, 0, "-",
        | Scalar, 2, "b",
        | StreamEnd, 0, ""
    );
}

#[test]
fn indented_marker_is_content()
{
    let mut l = lexer("  ---\n");

    events!(l =>
        | LineStart, 0, "  ",
        | Scalar, 2, "---" => "document markers only exist at column zero",
        | StreamEnd, 0, ""
    );
}

#[test]
fn single_dot_is_a_scalar()
{
    let mut l = lexer(".hidden\n");

    events!(l =>
        | LineStart, 0, "",
        | Scalar, 0, ".hidden",
        | StreamEnd, 0, ""
    );
}

#[test]
fn document_end_resets_to_directives()
{
    let mut l = lexer("a\n...\n%YAML 1.2\n");

    events!(l =>
        | LineStart, 0, "",
        | Scalar, 0, "a",
        | LineStart, 0, "",
        | DocumentEnd, 0, "...",
        | YamlDirective, 0, "YAML" => "directives are legal again after a document end",
        | MajorVersion, 6, "1",
        | MinorVersion, 8, "2",
        | StreamEnd, 0, ""
    );
}
