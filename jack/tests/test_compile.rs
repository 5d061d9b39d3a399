use jack::{lex::Lexer, prelude::*, LexErrorKind};
use std::collections::HashSet;

/// Compile a source unit into its instruction lines.
fn lines(source: &str) -> Vec<String> {
    match jack::compile(source) {
        Ok(program) => program.instructions().iter().map(|instr| instr.to_string()).collect(),
        Err(err) => panic!("{}", err),
    }
}

/// Wrap statements in a function with the given local declarations,
/// returning only the statement code after the `function` line.
fn body(vars: &str, statements: &str) -> Vec<String> {
    let source = format!(
        "class Main {{ function void main() {{ {} {} }} }}",
        vars, statements
    );
    let mut code = lines(&source);
    assert!(code[0].starts_with("function Main.main "));
    code.remove(0);
    code
}

#[test]
fn test_compile_counter() {
    let source = include_str!("Counter.jack");
    let expected = include_str!("Counter.vm");

    match jack::compile(source) {
        Ok(program) => {
            assert_eq!(program.class_name, "Counter");
            assert_eq!(program.to_string(), expected);
        }
        Err(err) => {
            panic!("{}", err)
        }
    }
}

#[test]
fn test_compile_is_idempotent() {
    let source = include_str!("Counter.jack");
    let first = jack::compile(source).unwrap().to_string();
    let second = jack::compile(source).unwrap().to_string();
    assert_eq!(first, second);
}

#[test]
#[rustfmt::skip]
fn test_if_else() {
    let code = body(
        "var int x, y;",
        "if (x > 0) { let y = 1; } else { let y = 2; } return;",
    );
    assert_eq!(code, vec![
        "push local 0",
        "push constant 0",
        "gt",
        "if-goto IF_TRUE0",
        "goto IF_FALSE0",
        "label IF_TRUE0",
        "push constant 1",
        "pop local 1",
        "goto IF_END0",
        "label IF_FALSE0",
        "push constant 2",
        "pop local 1",
        "label IF_END0",
        "push constant 0",
        "return",
    ]);
}

#[test]
#[rustfmt::skip]
fn test_if_without_else() {
    let code = body("var boolean b;", "if (b) { let b = false; } return;");
    assert_eq!(code, vec![
        "push local 0",
        "if-goto IF_TRUE0",
        "goto IF_FALSE0",
        "label IF_TRUE0",
        "push constant 0",
        "pop local 0",
        "label IF_FALSE0",
        "push constant 0",
        "return",
    ]);
}

#[test]
#[rustfmt::skip]
fn test_while() {
    let code = body("var int i;", "while (i < 10) { let i = i + 1; } return;");
    assert_eq!(code, vec![
        "label WHILE_EXP0",
        "push local 0",
        "push constant 10",
        "lt",
        "not",
        "if-goto WHILE_END0",
        "push local 0",
        "push constant 1",
        "add",
        "pop local 0",
        "goto WHILE_EXP0",
        "label WHILE_END0",
        "push constant 0",
        "return",
    ]);
}

#[test]
fn test_nested_labels_are_unique() {
    let code = body(
        "var int i;",
        "if (i) {
            while (i) {
                if (i) { while (i) { let i = 0; } } else { let i = 1; }
            }
        } else {
            if (i) { let i = 2; }
        }
        while (i) { let i = 3; }
        return;",
    );

    let labels: Vec<&str> = code
        .iter()
        .filter_map(|line| line.strip_prefix("label "))
        .collect();
    let unique: HashSet<&str> = labels.iter().cloned().collect();
    assert_eq!(labels.len(), unique.len(), "duplicate labels in {:?}", labels);

    // Counters are handed out in source order, regardless of depth.
    for label in [
        "IF_TRUE0", "IF_FALSE0", "IF_END0", "IF_TRUE1", "IF_FALSE1", "IF_END1",
        "IF_TRUE2", "IF_FALSE2", "WHILE_EXP0", "WHILE_END0", "WHILE_EXP1",
        "WHILE_END1", "WHILE_EXP2", "WHILE_END2",
    ] {
        assert!(unique.contains(label), "missing label {}", label);
    }
    assert!(!unique.contains("IF_END2"));
    assert!(!unique.contains("IF_TRUE3"));
}

#[test]
fn test_label_counters_reset_per_subroutine() {
    let code = lines(
        "class Main {
            function void a() { if (true) { } return; }
            function void b() { if (true) { } while (false) { } return; }
        }",
    );
    let true_labels = code.iter().filter(|line| *line == "label IF_TRUE0").count();
    assert_eq!(true_labels, 2);
    assert!(code.contains(&"label WHILE_EXP0".to_string()));
}

#[test]
#[rustfmt::skip]
fn test_constructor_allocates_fields() {
    let code = lines(
        "class Point {
            field int x, y;
            static int count;
            constructor Point new(int ax, int ay) {
                let x = ax;
                let y = ay;
                return this;
            }
        }",
    );
    assert_eq!(code, vec![
        "function Point.new 0",
        "push constant 2",
        "call Memory.alloc 1",
        "pop pointer 0",
        "push argument 0",
        "pop this 0",
        "push argument 1",
        "pop this 1",
        "push pointer 0",
        "return",
    ]);
}

#[test]
#[rustfmt::skip]
fn test_method_receiver_is_argument_zero() {
    let code = lines(
        "class Pair {
            method int sum(int a, int b) {
                var int total;
                let total = a + b;
                return total;
            }
        }",
    );
    assert_eq!(code, vec![
        "function Pair.sum 1",
        "push argument 0",
        "pop pointer 0",
        "push argument 1",
        "push argument 2",
        "add",
        "pop local 0",
        "push local 0",
        "return",
    ]);
}

#[test]
#[rustfmt::skip]
fn test_array_store() {
    let code = lines(
        "class Grid {
            field Array x;
            method void set() {
                var int i;
                let x[i] = 5;
                return;
            }
        }",
    );
    assert_eq!(code, vec![
        "function Grid.set 1",
        "push argument 0",
        "pop pointer 0",
        "push this 0",
        "push local 0",
        "add",
        "push constant 5",
        "pop temp 0",
        "pop pointer 1",
        "push temp 0",
        "pop that 0",
        "push constant 0",
        "return",
    ]);
}

#[test]
#[rustfmt::skip]
fn test_array_load_into_array_store() {
    let code = body("var Array a, b;", "let a[1] = b[2]; return;");
    assert_eq!(code, vec![
        "push local 0",
        "push constant 1",
        "add",
        "push local 1",
        "push constant 2",
        "add",
        "pop pointer 1",
        "push that 0",
        "pop temp 0",
        "pop pointer 1",
        "push temp 0",
        "pop that 0",
        "push constant 0",
        "return",
    ]);
}

#[test]
#[rustfmt::skip]
fn test_calls() {
    let code = lines(
        "class Shape {
            method void draw(int size) { return; }
            method void show() {
                var Point p, q;
                do draw(3);
                do p.dist(q);
                do Output.printInt(1, 2);
                do Screen.clearScreen();
                return;
            }
        }",
    );
    let show = code.iter().position(|line| line == "function Shape.show 2").unwrap();
    assert_eq!(&code[show..], &[
        "function Shape.show 2",
        "push argument 0",
        "pop pointer 0",
        // same class method, implicit receiver
        "push pointer 0",
        "push constant 3",
        "call Shape.draw 2",
        "pop temp 0",
        // method on a typed variable
        "push local 0",
        "push local 1",
        "call Point.dist 2",
        "pop temp 0",
        // function on a class name
        "push constant 1",
        "push constant 2",
        "call Output.printInt 2",
        "pop temp 0",
        "call Screen.clearScreen 0",
        "pop temp 0",
        "push constant 0",
        "return",
    ]);
}

#[test]
#[rustfmt::skip]
fn test_field_receiver_dispatches_on_declared_type() {
    let code = lines(
        "class Game {
            field Ball ball;
            method void step() {
                do ball.move(1);
                return;
            }
        }",
    );
    assert_eq!(&code[3..7], &[
        "push this 0",
        "push constant 1",
        "call Ball.move 2",
        "pop temp 0",
    ]);
}

#[test]
fn test_return_forms() {
    assert_eq!(body("", "return;"), vec!["push constant 0", "return"]);
    assert_eq!(
        body("var int x;", "return x + 1;"),
        vec!["push local 0", "push constant 1", "add", "return"]
    );
}

#[test]
#[rustfmt::skip]
fn test_expression_is_left_to_right() {
    let code = body("var int x;", "let x = 1 + 2 * 3 - 4 / 2; return;");
    assert_eq!(code, vec![
        "push constant 1",
        "push constant 2",
        "add",
        "push constant 3",
        "call Math.multiply 2",
        "push constant 4",
        "sub",
        "push constant 2",
        "call Math.divide 2",
        "pop local 0",
        "push constant 0",
        "return",
    ]);
}

#[test]
#[rustfmt::skip]
fn test_unary_and_grouping() {
    let code = body("var int x; var boolean b;", "let b = ~(x = 0) & (-x < 1) | b; return;");
    assert_eq!(code, vec![
        "push local 0",
        "push constant 0",
        "eq",
        "not",
        "push local 0",
        "neg",
        "push constant 1",
        "lt",
        "and",
        "push local 1",
        "or",
        "pop local 1",
        "push constant 0",
        "return",
    ]);
}

#[test]
#[rustfmt::skip]
fn test_keyword_constants() {
    let code = body("var boolean a; var Main m;", "let a = true; let a = false; let m = null; return;");
    assert_eq!(code, vec![
        "push constant 0",
        "not",
        "pop local 0",
        "push constant 0",
        "pop local 0",
        "push constant 0",
        "pop local 1",
        "push constant 0",
        "return",
    ]);
}

#[test]
#[rustfmt::skip]
fn test_string_constant() {
    let code = body("var String s;", "let s = \"Hi\"; return;");
    assert_eq!(code, vec![
        "push constant 2",
        "call String.new 1",
        "push constant 72",
        "call String.appendChar 2",
        "push constant 105",
        "call String.appendChar 2",
        "pop local 0",
        "push constant 0",
        "return",
    ]);
}

#[test]
fn test_local_shadows_field() {
    let code = lines(
        "class Box {
            field int size;
            method int get() { var int size; let size = 4; return size; }
        }",
    );
    assert!(code.contains(&"pop local 0".to_string()));
    assert!(!code.iter().any(|line| line.ends_with("this 0")));
}

#[test]
fn test_custom_runtime() {
    let runtime = Runtime {
        alloc: "Heap.alloc".into(),
        string_new: "Str.make".into(),
        string_append_char: "Str.push".into(),
        multiply: "Arith.mul".into(),
        divide: "Arith.div".into(),
    };
    let source = "class Node {
        field int value;
        constructor Node new() { let value = 2 * 3 / 1; do Out.print(\"a\"); return this; }
    }";
    let program = Compiler::new(Lexer::new(source))
        .with_runtime(runtime)
        .compile()
        .unwrap();
    let text = program.to_string();

    assert!(text.contains("call Heap.alloc 1\n"));
    assert!(text.contains("call Arith.mul 2\n"));
    assert!(text.contains("call Arith.div 2\n"));
    assert!(text.contains("call Str.make 1\n"));
    assert!(text.contains("call Str.push 2\n"));
    assert!(!text.contains("Memory.alloc"));
}

#[test]
fn test_unresolved_symbol() {
    let source = "class Main {\n  function void main() {\n    let missing = 1;\n    return;\n  }\n}";
    match jack::compile(source) {
        Err(JackError::UnresolvedSymbol { name, line }) => {
            assert_eq!(name, "missing");
            assert_eq!(line, 3);
        }
        other => panic!("unexpected result {:?}", other),
    }

    assert!(matches!(
        jack::compile("class Main { function int f() { return nope[0]; } }"),
        Err(JackError::UnresolvedSymbol { .. })
    ));
}

#[test]
fn test_unexpected_token() {
    let cases = [
        // missing semicolon
        "class Main { function void main() { return } }",
        // wrong header
        "klass Main { }",
        // keyword that isn't a constant used as a term
        "class Main { function int f() { return class; } }",
        // bare name in a do statement
        "class Main { function void f() { var int x; do x; return; } }",
        // missing closing brace
        "class Main { function void f() { return; }",
        // more than one class
        "class A { } class B { }",
        // statement keyword outside a subroutine
        "class Main { let x = 1; }",
    ];

    for source in cases {
        match jack::compile(source) {
            Err(JackError::UnexpectedToken { .. }) => {}
            other => panic!("expected unexpected token for {:?}, got {:?}", source, other),
        }
    }
}

#[test]
fn test_end_of_file_is_reported() {
    match jack::compile("class Main {") {
        Err(JackError::UnexpectedToken { encountered, .. }) => assert_eq!(encountered, "end-of-file"),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_lexical_error_aborts() {
    match jack::compile("class Main { function void f() { do Output.printString(\"open); return; } }") {
        Err(JackError::Lex(err)) => assert_eq!(err.kind, LexErrorKind::UnterminatedString),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
#[rustfmt::skip]
fn test_string_constant_non_ascii() {
    let code = body("var String s;", "let s = \"\u{e9}\u{3c0}\"; return;");
    assert_eq!(&code[..6], &[
        "push constant 2",
        "call String.new 1",
        "push constant 233",
        "call String.appendChar 2",
        "push constant 960",
        "call String.appendChar 2",
    ]);
}

#[test]
fn test_string_character_out_of_range() {
    let source = "class Main {\n  function void main() {\n    var String s;\n    let s = \"\u{1F600}\u{FF71}\";\n    return;\n  }\n}";
    match jack::compile(source) {
        Err(JackError::Lex(err)) => {
            assert_eq!(err.kind, LexErrorKind::UnsupportedCharacter('\u{1F600}'));
            assert_eq!(err.line, 4);
        }
        other => panic!("unexpected result {:?}", other),
    }

    // Every constant that does get emitted fits the integer range.
    let code = body("var String s;", "let s = \"\u{7FFF}\"; return;");
    assert!(code.contains(&"push constant 32767".to_string()));
}

#[test]
fn test_label_counter_limit() {
    let statements = "while (true) { }\n".repeat(u16::MAX as usize + 1);
    let source = format!("class Main {{ function void main() {{\n{}return; }} }}", statements);

    match jack::compile(&source) {
        // The header takes the first line, so the last loop sits on line 65537.
        Err(JackError::LimitExceeded { line, .. }) => assert_eq!(line, u16::MAX as usize + 2),
        other => panic!("unexpected result {:?}", other.map(|program| program.code.len())),
    }
}
