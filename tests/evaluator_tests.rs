// Evaluator behaviour, driven through whole programs

use emojiscript::ast::Identifier;
use emojiscript::error::Span;
use emojiscript::{
    interpret, Environment, EvalError, Evaluator, Lexer, Object, Parser, Program, Statement,
    Token, TokenType,
};
use pretty_assertions::assert_eq;
use std::rc::Rc;

/// Runs `source` in a fresh environment and returns the displayed result.
fn eval(source: &str) -> String {
    let output = interpret(source);
    assert!(
        output.errors.is_empty(),
        "unexpected syntax errors for {:?}: {:?}",
        source,
        output.errors
    );
    output
        .result
        .unwrap_or_else(|| panic!("no result for {:?}", source))
}

fn eval_object(evaluator: &mut Evaluator, source: &str) -> Rc<Object> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();
    assert!(parser.errors().is_empty(), "{:?}", parser.error_messages());
    evaluator
        .evaluate_program(&program)
        .unwrap_or_else(|error| panic!("evaluation aborted: {}", error))
}

fn check(cases: &[(&str, &str)]) {
    for (source, expected) in cases {
        assert_eq!(eval(source), *expected, "{:?}", source);
    }
}

#[test]
fn number_expressions() {
    check(&[
        ("5️⃣", "5"),
        ("1️⃣2️⃣3️⃣⏺️4️⃣5️⃣", "123.45"),
        ("➖5️⃣", "-5"),
        ("➖➖5️⃣", "5"),
        ("2️⃣➕3️⃣✖️4️⃣", "14"),
        ("📭2️⃣➕3️⃣📬✖️4️⃣", "20"),
        ("1️⃣0️⃣➗4️⃣", "2.5"),
        ("5️⃣➖1️⃣0️⃣", "-5"),
        ("2️⃣✖️📭5️⃣➕1️⃣0️⃣📬➗3️⃣", "10"),
        ("0️⃣⏺️5️⃣➕0️⃣⏺️2️⃣5️⃣", "0.75"),
    ]);
}

#[test]
fn boolean_expressions() {
    check(&[
        ("✅", "true"),
        ("❌", "false"),
        ("1️⃣🔽2️⃣", "true"),
        ("1️⃣🔼2️⃣", "false"),
        ("1️⃣🔽1️⃣", "false"),
        ("1️⃣⚖️1️⃣", "true"),
        ("1️⃣⚖️2️⃣", "false"),
        ("✅⚖️✅", "true"),
        ("❌⚖️❌", "true"),
        ("✅⚖️❌", "false"),
        ("📭1️⃣🔽2️⃣📬⚖️✅", "true"),
        ("📭1️⃣🔼2️⃣📬⚖️✅", "false"),
        ("5️⃣⚖️✅", "false"),
    ]);
}

#[test]
fn logical_operators_parse_but_do_not_evaluate() {
    check(&[
        ("✅🔺✅", "ERROR: unknown operator: BOOLEAN 🔺 BOOLEAN"),
        ("❌🔻✅", "ERROR: unknown operator: BOOLEAN 🔻 BOOLEAN"),
        ("1️⃣🔻2️⃣", "ERROR: unknown operator: NUMBER 🔻 NUMBER"),
        ("1️⃣🔽2️⃣🔺2️⃣🔽3️⃣", "ERROR: unknown operator: BOOLEAN 🔺 BOOLEAN"),
    ]);
}

#[test]
fn bang_operator() {
    check(&[
        ("❗✅", "false"),
        ("❗❌", "true"),
        ("❗5️⃣", "true"),
        ("❗❗✅", "true"),
        ("❗❗5️⃣", "false"),
        ("❗🤔❌🌅1️⃣🌇", "true"),
    ]);
}

#[test]
fn if_else_expressions() {
    check(&[
        ("🤔✅🌅1️⃣0️⃣🌇", "10"),
        ("🤔❌🌅1️⃣0️⃣🌇", "null"),
        ("🤔1️⃣🌅1️⃣0️⃣🌇", "10"),
        ("🤔1️⃣🔽2️⃣🌅1️⃣0️⃣🌇", "10"),
        ("🤔1️⃣🔼2️⃣🌅1️⃣0️⃣🌇", "null"),
        ("🤔1️⃣🔼2️⃣🌅1️⃣0️⃣🌇⤵️🌅2️⃣0️⃣🌇", "20"),
        ("🤔1️⃣🔽2️⃣🌅1️⃣0️⃣🌇⤵️🌅2️⃣0️⃣🌇", "10"),
        ("🤔🤔❌🌅1️⃣🌇🌅1️⃣🌇⤵️🌅2️⃣🌇", "2"),
        ("🤔✅🌅🌇", "null"),
    ]);
}

#[test]
fn return_statements() {
    check(&[
        ("🔙1️⃣0️⃣🚀", "10"),
        ("🔙1️⃣0️⃣🚀9️⃣", "10"),
        ("🔙2️⃣✖️5️⃣🚀9️⃣", "10"),
        ("9️⃣🚀🔙2️⃣✖️5️⃣🚀9️⃣", "10"),
        ("🔙🚀5️⃣", "null"),
        (
            "🤔1️⃣0️⃣🔼1️⃣🌅\n  🤔1️⃣0️⃣🔼1️⃣🌅\n    🔙1️⃣0️⃣🚀\n  🌇\n  🔙1️⃣🚀\n🌇",
            "10",
        ),
    ]);
}

#[test]
fn let_statements() {
    check(&[
        ("📝🅰️➡️5️⃣🚀🅰️", "5"),
        ("📝🅰️➡️5️⃣✖️5️⃣🚀🅰️", "25"),
        ("📝🅰️➡️5️⃣🚀📝🅱️➡️🅰️🚀🅱️", "5"),
        (
            "📝🅰️➡️5️⃣✖️5️⃣🚀📝🅱️➡️🅰️🚀📝©️➡️🅰️➕🅱️➕5️⃣🚀©️",
            "55",
        ),
        ("📝🅰️➡️5️⃣", "null"),
        ("📝🅰️➡️1️⃣🚀📝🅰️➡️🅰️➕1️⃣🚀🅰️", "2"),
    ]);
}

#[test]
fn function_values() {
    check(&[
        ("🔧🅰️🌅🅰️➕2️⃣🌇", "🔧(🅰️) 🌅(🅰️ ➕ 2)🌇"),
        ("🔧🌅🌇", "🔧() 🌅🌇"),
    ]);
}

#[test]
fn function_application() {
    check(&[
        ("📝🆔➡️🔧🅰️🌅🅰️🌇🚀🆔📭5️⃣📬", "5"),
        ("📝🆔➡️🔧🅰️🌅🔙🅰️🚀🌇🚀🆔📭5️⃣📬", "5"),
        ("📝🆎➡️🔧🅰️🔸🅱️🌅🅰️➕🅱️🌇🚀🆎📭2️⃣🔸3️⃣📬", "5"),
        ("📝🆎➡️🔧🅰️🔸🅱️🌅🅰️➕🅱️🌇🚀🆎📭5️⃣➕5️⃣🔸🆎📭5️⃣🔸5️⃣📬📬", "20"),
        ("🔧🅰️🌅🅰️🌇📭5️⃣📬", "5"),
        ("📝🆕➡️🔧🌅🌇🚀🆕📭📬", "null"),
        ("📝🆗➡️🔧🌅🔙🚀9️⃣🌇🚀🆗📭📬", "null"),
    ]);
}

#[test]
fn return_stops_at_the_call_boundary() {
    // The inner 🔙 ends the function, not the program
    check(&[(
        "📝🆔➡️🔧🅰️🌅🔙🅰️🚀🌇🚀🆔📭1️⃣📬🚀2️⃣",
        "2",
    )]);
}

#[test]
fn closures() {
    check(&[
        (
            "📝🆎➡️🔧🅰️🌅🔧🅱️🌅🅰️➕🅱️🌇🌇🚀📝🆕➡️🆎📭2️⃣📬🚀🆕📭3️⃣📬",
            "5",
        ),
        // A closure sees later rebinding in the frame it captured
        ("📝🅰️➡️1️⃣🚀📝🆎➡️🔧🌅🅰️🌇🚀📝🅰️➡️2️⃣🚀🆎📭📬", "2"),
        // Parameters shadow outer bindings without touching them
        ("📝🅰️➡️1️⃣🚀📝🆔➡️🔧🅰️🌅🅰️🌇🚀🆔📭9️⃣📬🚀🅰️", "1"),
    ]);
}

#[test]
fn recursion() {
    let factorial = "📝🆒➡️🔧🅰️🌅\n  🤔🅰️🔽2️⃣🌅🔙1️⃣🌇\n  🔙🅰️✖️🆒📭🅰️➖1️⃣📬\n🌇🚀\n🆒📭5️⃣📬";
    assert_eq!(eval(factorial), "120");

    let fibonacci = "📝🆘➡️🔧🅰️🌅\n  🤔🅰️🔽2️⃣🌅🔙🅰️🌇\n  🔙🆘📭🅰️➖1️⃣📬➕🆘📭🅰️➖2️⃣📬\n🌇🚀\n🆘📭1️⃣0️⃣📬";
    assert_eq!(eval(fibonacci), "55");
}

#[test]
fn runtime_errors() {
    check(&[
        ("1️⃣➗0️⃣", "ERROR: division by zero"),
        ("🆓", "ERROR: identifier not found: 🆓"),
        ("🆓➕1️⃣", "ERROR: identifier not found: 🆓"),
        ("5️⃣➕✅", "ERROR: type mismatch: NUMBER ➕ BOOLEAN"),
        ("5️⃣➕✅🚀5️⃣", "ERROR: type mismatch: NUMBER ➕ BOOLEAN"),
        ("➖✅", "ERROR: unknown operator: ➖BOOLEAN"),
        ("✅➕❌", "ERROR: unknown operator: BOOLEAN ➕ BOOLEAN"),
        ("✅🔼❌", "ERROR: unknown operator: BOOLEAN 🔼 BOOLEAN"),
        ("5️⃣🔺5️⃣", "ERROR: unknown operator: NUMBER 🔺 NUMBER"),
        ("❗🔧🌅🌇", "ERROR: unknown operator: ❗FUNCTION"),
        ("🤔1️⃣➗0️⃣🌅1️⃣🌇", "ERROR: division by zero"),
        (
            "🤔1️⃣0️⃣🔼1️⃣🌅🤔1️⃣0️⃣🔼1️⃣🌅🔙✅➕❌🚀🌇🔙1️⃣🚀🌇",
            "ERROR: unknown operator: BOOLEAN ➕ BOOLEAN",
        ),
        ("📝🅰️➡️🆓🚀5️⃣", "ERROR: identifier not found: 🆓"),
        ("🔙🆓", "ERROR: identifier not found: 🆓"),
    ]);
}

#[test]
fn call_errors() {
    check(&[
        ("5️⃣📭📬", "ERROR: not a function: NUMBER"),
        (
            "📝🆎➡️🔧🅰️🔸🅱️🌅🅰️➕🅱️🌇🚀🆎📭1️⃣📬",
            "ERROR: wrong number of arguments: expected 2, got 1",
        ),
        (
            "📝🆔➡️🔧🅰️🌅🅰️🌇🚀🆔📭1️⃣🔸2️⃣📬",
            "ERROR: wrong number of arguments: expected 1, got 2",
        ),
        (
            "📝🆔➡️🔧🅰️🌅🅰️🌇🚀🆔📭🆓📬",
            "ERROR: identifier not found: 🆓",
        ),
        (
            "📝🆎➡️🔧🌅📝🅱️➡️1️⃣🚀🅱️🌇🚀🆎📭📬🚀🅱️",
            "ERROR: identifier not found: 🅱️",
        ),
    ]);
}

#[test]
fn function_equality_is_identity() {
    check(&[
        ("📝🆎➡️🔧🌅1️⃣🌇🚀🆎⚖️🆎", "true"),
        ("🔧🌅1️⃣🌇⚖️🔧🌅1️⃣🌇", "false"),
        ("📝🆎➡️🔧🌅1️⃣🌇🚀📝🆑➡️🆎🚀🆎⚖️🆑", "true"),
    ]);
}

#[test]
fn booleans_and_null_are_shared() {
    let mut evaluator = Evaluator::new();

    assert!(Rc::ptr_eq(
        &eval_object(&mut evaluator, "✅"),
        &Object::boolean(true)
    ));
    assert!(Rc::ptr_eq(
        &eval_object(&mut evaluator, "1️⃣🔼2️⃣"),
        &Object::boolean(false)
    ));
    assert!(Rc::ptr_eq(
        &eval_object(&mut evaluator, "🤔❌🌅1️⃣🌇"),
        &Object::null()
    ));
}

#[test]
fn call_depth_is_bounded() {
    let mut evaluator = Evaluator::new().with_max_call_depth(16);
    let result = eval_object(&mut evaluator, "📝🆖➡️🔧🌅🆖📭📬🌇🚀🆖📭📬");
    assert_eq!(result.to_string(), "ERROR: maximum call depth exceeded (16)");

    // Depth is released again after the error unwinds
    let result = eval_object(&mut evaluator, "📝🆔➡️🔧🅰️🌅🅰️🌇🚀🆔📭7️⃣📬");
    assert_eq!(result.to_string(), "7");
}

#[test]
fn default_call_depth_allows_recursive_sums() {
    let sum = "📝💲➡️🔧🅰️🌅\n  🤔🅰️🔽1️⃣🌅🔙0️⃣🌇\n  🔙🅰️➕💲📭🅰️➖1️⃣📬\n🌇🚀\n💲📭1️⃣0️⃣0️⃣📬";
    assert_eq!(eval(sum), "5050");
}

#[test]
fn dropping_the_evaluator_frees_closure_cycles() {
    let cases = [
        "📝🆎➡️🔧🅰️🌅🅰️🌇🚀🆎📭1️⃣📬",
        "📝🆎➡️🔧🅰️🌅🔧🅱️🌅🅰️➕🅱️🌇🌇🚀📝🆕➡️🆎📭2️⃣📬🚀🆕📭3️⃣📬",
        "📝🆒➡️🔧🅰️🌅🤔🅰️🔽2️⃣🌅🔙1️⃣🌇🔙🅰️✖️🆒📭🅰️➖1️⃣📬🌇🚀🆒📭5️⃣📬",
    ];

    for source in cases {
        let mut evaluator = Evaluator::new();
        let global = evaluator.environment();

        let result = eval_object(&mut evaluator, source);
        assert!(!result.is_error(), "{}", result);
        // The stored function points back at the frame that holds it
        assert!(Rc::strong_count(&global) > 2, "{:?}", source);

        drop(evaluator);
        assert_eq!(Rc::strong_count(&global), 1, "{:?}", source);
        assert!(global.borrow().entries().is_empty());
    }
}

#[test]
fn evaluator_keeps_bindings_between_programs() {
    let mut evaluator = Evaluator::new();

    eval_object(&mut evaluator, "📝🅰️➡️4️⃣🚀");
    eval_object(&mut evaluator, "📝🆎➡️🔧🅱️🌅🅰️✖️🅱️🌇");
    let result = eval_object(&mut evaluator, "🆎📭3️⃣📬");

    assert_eq!(result.to_string(), "12");

    let names: Vec<String> = evaluator
        .environment()
        .borrow()
        .entries()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"🅰️".to_string()));
    assert!(names.contains(&"🆎".to_string()));
}

#[test]
fn environment_chain() {
    let global = Environment::new_shared();
    global.borrow_mut().set("🅰️", Object::number(1.0));
    global.borrow_mut().set("🅱️", Object::number(2.0));

    let inner = Environment::enclosed(Rc::clone(&global));
    inner.borrow_mut().set("🅰️", Object::number(10.0));

    let lookup = |env: &Rc<std::cell::RefCell<Environment>>, name: &str| {
        env.borrow().get(name).map(|value| value.to_string())
    };

    assert_eq!(lookup(&inner, "🅰️"), Some("10".to_string()));
    assert_eq!(lookup(&inner, "🅱️"), Some("2".to_string()));
    assert_eq!(lookup(&global, "🅰️"), Some("1".to_string()));
    assert_eq!(lookup(&inner, "©️"), None);
}

#[test]
fn incomplete_let_aborts_evaluation() {
    let let_token = Token::new(TokenType::Let, "📝".to_string(), Span::new(0, 1));
    let name_token = Token::new(TokenType::Identifier, "🅰️".to_string(), Span::new(1, 3));
    let program = Program {
        statements: vec![Statement::Let {
            token: let_token,
            name: Identifier::new(name_token),
            value: None,
        }],
    };

    let result = Evaluator::new().evaluate_program(&program);
    assert!(matches!(result, Err(EvalError::IncompleteNode(_))));
}
