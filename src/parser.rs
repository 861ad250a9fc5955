//! This module provides the parser for `.tm` machine definitions, utilizing the `pest` crate.
//! The grammar lives in `grammar.pest`; this module turns the parse tree into a validated
//! [`Definition`].

use crate::{
    definition::Definition,
    machine::Machine,
    types::{
        HeadMove, Symbol, TransitionKey, TransitionResult, TuringMachineError,
        DEFAULT_BLANK_TOKEN,
    },
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;

/// Derives a `PestParser` for the definition grammar in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct DefinitionParser;

/// Parses a `.tm` definition into a [`Definition`].
///
/// # Returns
///
/// * `Ok(Definition)` if the input is syntactically valid and the machine builds.
/// * `Err(TuringMachineError::ParseError)` for syntax errors and repeated sections.
/// * `Err(TuringMachineError::DefinitionError)` if a required section is missing.
/// * `Err(TuringMachineError::ConfigError)` if the states are inconsistent.
pub fn parse(input: &str) -> Result<Definition, TuringMachineError> {
    let root = DefinitionParser::parse(Rule::program, input.trim())
        .map_err(|e| TuringMachineError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| TuringMachineError::DefinitionError("Empty definition".to_string()))?;

    parse_program(root)
}

/// Parses the top-level sections of a definition.
///
/// Sections may appear in any order, so symbol conversion waits until the blank token is known.
fn parse_program(pair: Pair<Rule>) -> Result<Definition, TuringMachineError> {
    let mut name: Option<String> = None;
    let mut states: Option<Vec<String>> = None;
    let mut initial: Option<String> = None;
    let mut finals: Vec<String> = Vec::new();
    let mut alphabet: Vec<String> = Vec::new();
    let mut tape_alphabet: Vec<String> = Vec::new();
    let mut blank = DEFAULT_BLANK_TOKEN.to_string();
    let mut inputs: Vec<String> = Vec::new();
    let mut rules: Option<Pair<Rule>> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        if rule == Rule::EOI {
            continue;
        }

        check_unique_rule(rule, span, &mut seen)?;

        match rule {
            Rule::name => {
                let text = parse_inner_string(p).trim().to_string();
                name = (!text.is_empty()).then_some(text);
            }
            Rule::states => states = Some(parse_tokens(p.into_inner())),
            Rule::initial => initial = Some(parse_string(&mut p.into_inner())),
            Rule::finals => finals = parse_tokens(p.into_inner()),
            Rule::alphabet => alphabet = parse_tokens(p.into_inner()),
            Rule::tape_alphabet => tape_alphabet = parse_tokens(p.into_inner()),
            Rule::blank => blank = parse_string(&mut p.into_inner()),
            Rule::inputs => inputs = parse_inputs(p),
            Rule::rules => rules = Some(p),
            _ => {}
        }
    }

    let states = check_required_rule(states, "states")?;
    let initial = check_required_rule(initial, "initial")?;
    let rules = check_required_rule(rules, "rules")?;

    let transitions = parse_transitions(rules, &blank);
    let tape_alphabet = tape_alphabet.iter().map(|token| to_symbol(token, &blank));

    let machine = Machine::builder()
        .states(states)
        .initial(initial)
        .finals(finals)
        .alphabet(alphabet)
        .tape_alphabet(tape_alphabet)
        .transitions(transitions)
        .build()?;

    Ok(Definition {
        name,
        machine,
        simulation_strings: inputs,
    })
}

/// Parses every `transition` line of the `rules:` section.
///
/// A missing move defaults to Stay. Moves are kept verbatim and checked when they fire.
fn parse_transitions(pair: Pair<Rule>, blank: &str) -> Vec<(TransitionKey, TransitionResult)> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::transition)
        .map(|p| {
            let mut pairs = p.into_inner();

            let state = parse_string(&mut pairs);
            let memory = parse_symbol(&mut pairs, blank);
            let read = parse_symbol(&mut pairs, blank);
            let key = TransitionKey::new(state, memory, read);

            let next_state = parse_string(&mut pairs);
            let memory = parse_symbol(&mut pairs, blank);
            let write = parse_symbol(&mut pairs, blank);
            let head_move = pairs
                .next()
                .map(|m| HeadMove::new(m.as_str()))
                .unwrap_or_default();

            let result = TransitionResult {
                next_state,
                memory,
                write,
                head_move,
            };

            (key, result)
        })
        .collect()
}

/// Parses the `inputs:` section. Quoted inputs may be empty or contain spaces.
fn parse_inputs(pair: Pair<Rule>) -> Vec<String> {
    pair.into_inner()
        .map(|p| match p.as_rule() {
            Rule::string => parse_inner_string(p),
            _ => p.as_str().to_string(),
        })
        .collect()
}

/// Collects the tokens of a `symbols` list.
fn parse_tokens(pairs: Pairs<Rule>) -> Vec<String> {
    pairs
        .flat_map(|p| p.into_inner())
        .filter(|p| p.as_rule() == Rule::token)
        .map(|p| p.as_str().to_string())
        .collect()
}

/// Parses the next token of `pairs` as a symbol.
fn parse_symbol(pairs: &mut Pairs<Rule>, blank: &str) -> Symbol {
    to_symbol(&parse_string(pairs), blank)
}

/// Converts a token to a symbol, mapping the blank token to [`Symbol::Blank`].
fn to_symbol(token: &str, blank: &str) -> Symbol {
    if token == blank {
        Symbol::Blank
    } else {
        Symbol::literal(token)
    }
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Extracts the inner string content from a `Pair`.
fn parse_inner_string(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

/// Extracts the string content from the current `Pair` in a `Pairs` iterator.
fn parse_string(pairs: &mut Pairs<Rule>) -> String {
    pairs
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

/// Checks that a top-level section is declared at most once.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), TuringMachineError> {
    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{}:\" declaration", section_name(rule)),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, TuringMachineError> {
    value.ok_or_else(|| TuringMachineError::DefinitionError(format!("Missing '{name}' section")))
}

/// Returns the keyword a section is declared with.
fn section_name(rule: Rule) -> &'static str {
    match rule {
        Rule::name => "name",
        Rule::states => "states",
        Rule::initial => "initial",
        Rule::finals => "final",
        Rule::alphabet => "alphabet",
        Rule::tape_alphabet => "tape_alphabet",
        Rule::blank => "blank",
        Rule::inputs => "inputs",
        Rule::rules => "rules",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, HaltReason};

    const UNARY_INCREMENT: &str = r#"
name: Unary increment
states: q0, qf
initial: q0
final: qf
alphabet: 1
tape_alphabet: 1, _
inputs: "11", ""
rules:
  q0, _, 1 -> q0, _, 1, R
  q0, _, _ -> qf, _, 1
"#;

    #[test]
    fn test_parse_simple_definition() {
        let definition = parse(UNARY_INCREMENT).unwrap();
        let machine = &definition.machine;

        assert_eq!(definition.name.as_deref(), Some("Unary increment"));
        assert_eq!(definition.simulation_strings, vec!["11", ""]);
        assert_eq!(machine.initial_state(), "q0");
        assert!(machine.is_final("qf"));
        assert_eq!(machine.table().len(), 2);
        assert!(machine.tape_alphabet().contains(&Symbol::Blank));
        assert!(machine.alphabet().contains("1"));
    }

    #[test]
    fn test_parse_rule_fields() {
        let definition = parse(UNARY_INCREMENT).unwrap();
        let table = definition.machine.table();

        let walk = table
            .lookup("q0", &Symbol::Blank, &Symbol::from('1'))
            .unwrap();
        assert_eq!(walk.head_move.direction().unwrap(), Direction::Right);

        let finish = table.lookup("q0", &Symbol::Blank, &Symbol::Blank).unwrap();
        assert_eq!(finish.next_state, "qf");
        assert_eq!(finish.write, Symbol::from('1'));
        assert_eq!(finish.head_move, HeadMove::default());
    }

    #[test]
    fn test_parsed_definition_runs() {
        let definition = parse(UNARY_INCREMENT).unwrap();
        let result = definition.machine.run("11", 1000).unwrap();

        assert_eq!(result.final_tape, "111");
        assert!(result.accepted);
        assert_eq!(result.halted_by, HaltReason::NoTransition);
    }

    #[test]
    fn test_parse_custom_blank_token() {
        let input = r#"
states: q0, q1
initial: q0
blank: B
rules:
  q0, B, B -> q1, x, _, L
"#;
        let definition = parse(input).unwrap();
        let result = definition
            .machine
            .table()
            .lookup("q0", &Symbol::Blank, &Symbol::Blank)
            .unwrap();

        assert_eq!(result.memory, Symbol::from('x'));
        assert_eq!(result.write, Symbol::from('_'));
        assert_eq!(definition.name, None);
    }

    #[test]
    fn test_parse_compact_transitions_with_crlf() {
        let input = "states: q0, qf\r\ninitial: q0\r\nfinal: qf\r\nrules:\r\n  q0,_,1->q0,_,1,R\r\n  q0,_,_->qf,_,1\r\n";
        let definition = parse(input).unwrap();
        let machine = &definition.machine;

        assert_eq!(machine.table().len(), 2);
        let walk = machine
            .table()
            .lookup("q0", &Symbol::Blank, &Symbol::from('1'))
            .unwrap();
        assert_eq!(walk.next_state, "q0");
        assert_eq!(walk.head_move.as_str(), "R");

        let result = machine.run("1", 10).unwrap();
        assert_eq!(result.final_tape, "11");
        assert!(result.accepted);
    }

    #[test]
    fn test_parse_comments_and_bare_inputs() {
        let input = r#"
# Accepts anything
states: q0   # just one
initial: q0
final: q0
inputs: ab, ba
rules:
"#;
        let definition = parse(input).unwrap();

        assert_eq!(definition.simulation_strings, vec!["ab", "ba"]);
        assert!(definition.machine.table().is_empty());
    }

    #[test]
    fn test_parse_keeps_invalid_move_verbatim() {
        let input = r#"
states: q0
initial: q0
rules:
  q0, _, a -> q0, _, b, X
"#;
        let definition = parse(input).unwrap();
        let result = definition
            .machine
            .table()
            .lookup("q0", &Symbol::Blank, &Symbol::from('a'))
            .unwrap();

        assert_eq!(result.head_move.as_str(), "X");
        assert!(matches!(
            definition.machine.run("a", 10),
            Err(TuringMachineError::InvalidMove(_))
        ));
    }

    #[test]
    fn test_parse_duplicate_section() {
        let input = r#"
name: First Name
name: Second Name
states: q0
initial: q0
rules:
"#;
        let result = parse(input);
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error
            .to_string()
            .contains("Duplicate \"name:\" declaration"));
    }

    #[test]
    fn test_parse_missing_initial() {
        let input = r#"
states: q0
rules:
"#;
        let error = parse(input).unwrap_err();

        assert_eq!(
            error,
            TuringMachineError::DefinitionError("Missing 'initial' section".to_string())
        );
    }

    #[test]
    fn test_parse_undeclared_initial_state() {
        let input = r#"
states: q0
initial: q9
rules:
"#;
        assert!(matches!(
            parse(input),
            Err(TuringMachineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_parse_syntax_error() {
        let input = r#"
states: q0
initial: q0
rules:
  q0, _ -> q1
"#;
        assert!(matches!(
            parse(input),
            Err(TuringMachineError::ParseError(_))
        ));
    }
}
