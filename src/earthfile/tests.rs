//! Tests for Earthfile text and JSON loading.

use super::*;
use crate::ast::{Command, ElseIf, ForBlock, IfBlock, Statement, Target, WaitBlock};
use anyhow::{Context, Result as AnyResult, ensure};
use miette::Diagnostic;
use rstest::rstest;

fn cmd(name: &str, args: &[&str]) -> Statement {
    Statement::Command(Command::new(name, args.iter().copied()))
}

fn parse_err(src: &str) -> String {
    match from_str(src) {
        Ok(earthfile) => panic!("expected parse failure, got {earthfile:?}"),
        Err(EarthfileError::Parse { source, .. }) => source.to_string(),
    }
}

#[rstest]
fn parses_targets_in_declaration_order() -> AnyResult<()> {
    let src = concat!(
        "VERSION 0.7\n",
        "FROM alpine:3.18\n",
        "\n",
        "build:\n",
        "    COPY +deps/out ./\n",
        "    SAVE ARTIFACT out AS LOCAL out\n",
        "\n",
        "deps:\n",
        "    RUN echo hi\n",
    );
    let earthfile = from_str(src)?;
    ensure!(
        earthfile.version.as_ref().map(|v| v.args.clone()) == Some(vec!["0.7".to_owned()]),
        "unexpected version {:?}",
        earthfile.version
    );
    ensure!(earthfile.base_recipe == vec![cmd("FROM", &["alpine:3.18"])]);
    ensure!(
        earthfile.targets
            == vec![
                Target::new(
                    "build",
                    vec![
                        cmd("COPY", &["+deps/out", "./"]),
                        cmd("SAVE ARTIFACT", &["out", "AS", "LOCAL", "out"]),
                    ],
                ),
                Target::new("deps", vec![cmd("RUN", &["echo", "hi"])]),
            ],
        "unexpected targets {:#?}",
        earthfile.targets
    );
    Ok(())
}

#[rstest]
fn parses_nested_blocks() -> AnyResult<()> {
    let src = concat!(
        "all:\n",
        "    WAIT\n",
        "        BUILD +a\n",
        "        FOR f IN x y\n",
        "            BUILD +b\n",
        "        END\n",
        "    END\n",
        "    IF [ \"$X\" = \"1\" ]\n",
        "        BUILD +c\n",
        "    ELSE IF false\n",
        "        BUILD +d\n",
        "    ELSE\n",
        "        BUILD +e\n",
        "    END\n",
    );
    let earthfile = from_str(src)?;
    let target = earthfile.targets.first().context("target")?;
    let expected = vec![
        Statement::Wait(WaitBlock {
            args: Vec::new(),
            body: vec![
                cmd("BUILD", &["+a"]),
                Statement::For(ForBlock {
                    args: vec!["f".into(), "IN".into(), "x".into(), "y".into()],
                    body: vec![cmd("BUILD", &["+b"])],
                }),
            ],
        }),
        Statement::If(IfBlock {
            expression: vec!["[".into(), "$X".into(), "=".into(), "1".into(), "]".into()],
            if_body: vec![cmd("BUILD", &["+c"])],
            else_if: vec![ElseIf {
                expression: vec!["false".into()],
                body: vec![cmd("BUILD", &["+d"])],
            }],
            else_body: Some(vec![cmd("BUILD", &["+e"])]),
        }),
    ];
    ensure!(target.recipe == expected, "unexpected recipe {:#?}", target.recipe);
    Ok(())
}

#[rstest]
fn continuation_lines_form_one_command() -> AnyResult<()> {
    let src = "build:\n    COPY \\\n        +deps/out \\\n        ./\n";
    let earthfile = from_str(src)?;
    let target = earthfile.targets.first().context("target")?;
    ensure!(target.recipe == vec![cmd("COPY", &["+deps/out", "./"])]);
    Ok(())
}

#[rstest]
fn functions_are_not_targets() -> AnyResult<()> {
    let src = concat!(
        "INSTALL:\n",
        "    FUNCTION\n",
        "    RUN apk add git\n",
        "build:\n",
        "    DO +INSTALL\n",
    );
    let earthfile = from_str(src)?;
    ensure!(earthfile.functions.len() == 1, "expected one function");
    let function = earthfile.functions.first().context("function")?;
    ensure!(function.name == "INSTALL");
    ensure!(function.recipe == vec![cmd("RUN", &["apk", "add", "git"])]);
    ensure!(earthfile.targets == vec![Target::new("build", vec![cmd("DO", &["+INSTALL"])])]);
    Ok(())
}

#[rstest]
#[case("FROM DOCKERFILE -f Dockerfile .", "FROM DOCKERFILE", &["-f", "Dockerfile", "."])]
#[case("SAVE IMAGE app:latest", "SAVE IMAGE", &["app:latest"])]
#[case("GIT CLONE url dir", "GIT CLONE", &["url", "dir"])]
#[case("FROM +base", "FROM", &["+base"])]
#[case("RUN echo 'two words'", "RUN", &["echo", "two words"])]
fn command_names(#[case] line: &str, #[case] name: &str, #[case] args: &[&str]) -> AnyResult<()> {
    let earthfile = from_str(&format!("t:\n    {line}\n"))?;
    let target = earthfile.targets.first().context("target")?;
    ensure!(target.recipe == vec![cmd(name, args)], "unexpected {:?}", target.recipe);
    Ok(())
}

#[rstest]
#[case::unterminated_if("t:\n    IF true\n        RUN a\n", "unterminated IF block at line 2, column 5")]
#[case::unterminated_for("t:\n    FOR x IN a\nu:\n    RUN b\n", "unterminated FOR block at line 2, column 5")]
#[case::stray_end("t:\n    RUN a\n    END\n", "END without a matching IF, FOR, or WAIT at line 3, column 5")]
#[case::stray_else("t:\n    ELSE\n", "ELSE without a matching IF at line 2, column 5")]
#[case::else_in_wait("t:\n    WAIT\n    ELSE\n    END\n", "ELSE inside WAIT without a matching IF at line 3, column 5")]
#[case::branch_after_else(
    "t:\n    IF a\n    ELSE\n    ELSE IF b\n    END\n",
    "ELSE branch after the final ELSE at line 4, column 5"
)]
#[case::unindented("t:\nRUN a\n", "recipe lines must be indented at line 2, column 1")]
#[case::quotes("t:\n    RUN echo \"oops\n", "unbalanced quotes in command at line 2, column 5")]
#[case::with_docker("t:\n    WITH DOCKER\n    END\n", "WITH blocks are not supported at line 2, column 5")]
#[case::top_level_end("END\n", "END without a matching IF, FOR, or WAIT at line 1, column 1")]
fn syntax_errors(#[case] src: &str, #[case] expected: &str) {
    assert_eq!(parse_err(src), expected);
}

#[rstest]
fn syntax_errors_are_named_diagnostics() -> AnyResult<()> {
    let err = from_str_named("t:\n    END\n", "dir/Earthfile").expect_err("stray END");
    ensure!(err.to_string() == "failed to parse dir/Earthfile");
    let code = err.code().map(|c| c.to_string());
    ensure!(code.as_deref() == Some("earthgraph::earthfile::parse"));
    let EarthfileError::Parse { source, .. } = &err;
    let inner = source.code().map(|c| c.to_string());
    ensure!(inner.as_deref() == Some("earthgraph::earthfile::syntax"));
    Ok(())
}

#[rstest]
fn empty_source_has_no_targets() -> AnyResult<()> {
    let earthfile = from_str("# nothing here\n\n")?;
    ensure!(earthfile == Earthfile::default());
    Ok(())
}

#[rstest]
fn json_ast_is_accepted() -> AnyResult<()> {
    let json = r#"{
        "version": {"args": ["0.7"]},
        "baseRecipe": [{"command": {"name": "FROM", "args": ["alpine"]}}],
        "targets": [
            {"name": "A", "recipe": [
                {"command": {"name": "COPY", "args": ["+B/output", "./"]}, "sourceLocation": {}},
                {"if": {"expression": ["true"], "ifBody": [], "elseBody": [
                    {"command": {"name": "BUILD", "args": ["+C"]}}
                ]}},
                {"for": {"args": ["x", "IN", "y"], "body": []}},
                {"wait": {"body": []}}
            ]},
            {"name": "B", "recipe": [{"command": {"name": "RUN", "args": ["echo", "hi"]}}]}
        ],
        "userCommands": [{"name": "HELPER", "recipe": []}]
    }"#;
    let earthfile = from_str(json)?;
    ensure!(earthfile.targets.len() == 2);
    ensure!(earthfile.functions.len() == 1);
    ensure!(earthfile.base_recipe == vec![cmd("FROM", &["alpine"])]);
    let first = earthfile.targets.first().context("target")?;
    ensure!(first.recipe.len() == 4, "unexpected recipe {:?}", first.recipe);
    Ok(())
}

#[rstest]
fn json_nulls_read_as_empty_lists() -> AnyResult<()> {
    let json = r#"{
        "baseRecipe": null,
        "targets": [
            {"name": "A", "recipe": [
                {"wait": {"args": null, "body": null}},
                {"if": {"expression": null, "ifBody": null, "elseIf": null, "elseBody": null}},
                {"command": {"name": "RUN", "args": null}}
            ]},
            {"name": "B", "recipe": null}
        ],
        "userCommands": null
    }"#;
    let earthfile = from_str(json)?;
    ensure!(earthfile.base_recipe.is_empty());
    ensure!(earthfile.functions.is_empty());
    let first = earthfile.targets.first().context("target")?;
    ensure!(
        first.recipe
            == vec![
                Statement::Wait(WaitBlock::default()),
                Statement::If(IfBlock::default()),
                cmd("RUN", &[]),
            ],
        "unexpected recipe {:?}",
        first.recipe
    );
    ensure!(earthfile.targets.get(1) == Some(&Target::new("B", Vec::new())));
    Ok(())
}

#[rstest]
fn json_functions_key_is_accepted() -> AnyResult<()> {
    let json = r#"{"targets": [], "functions": [{"name": "HELPER", "recipe": []}]}"#;
    let earthfile = from_str(json)?;
    let names: Vec<&str> = earthfile.functions.iter().map(|f| f.name.as_str()).collect();
    ensure!(names == ["HELPER"], "unexpected functions {names:?}");
    Ok(())
}

#[rstest]
fn hash_prefixed_arguments_are_kept() -> AnyResult<()> {
    let earthfile = from_str("A:\n    COPY #x +B/out ./\nB:\n    RUN true\n")?;
    let target = earthfile.targets.first().context("target")?;
    ensure!(
        target.recipe == vec![cmd("COPY", &["#x", "+B/out", "./"])],
        "unexpected recipe {:?}",
        target.recipe
    );
    Ok(())
}

#[rstest]
#[case::with(r#"{"targets":[{"name":"a","recipe":[{"with":{}}]}]}"#, "not supported")]
#[case::empty_statement(r#"{"targets":[{"name":"a","recipe":[{}]}]}"#, "missing one of")]
#[case::ambiguous(
    r#"{"targets":[{"name":"a","recipe":[{"command":{"name":"RUN"},"wait":{}}]}]}"#,
    "mutually exclusive"
)]
#[case::truncated(r#"{"targets":["#, "JSON parse error")]
fn json_errors(#[case] src: &str, #[case] needle: &str) {
    let message = parse_err(src);
    assert!(message.contains(needle), "unexpected message: {message}");
}

#[rstest]
fn ast_serialises_to_json_ast_shape() -> AnyResult<()> {
    let earthfile = from_str("a:\n    IF x\n        BUILD +b\n    END\n")?;
    let json = serde_json::to_value(&earthfile)?;
    let statement = json
        .pointer("/targets/0/recipe/0/if/ifBody/0/command/name")
        .context("if body command")?;
    ensure!(statement == "BUILD", "unexpected JSON {json}");
    let reparsed = from_str(&json.to_string())?;
    ensure!(reparsed == earthfile);
    Ok(())
}
