use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::ast::*;
use crate::error::ParseError;

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct HornParser;

/**
 * Parses source text into its top-level nodes without checking that they
 * form clauses.
 */
pub fn parse_nodes(code: &str) -> Result<Vec<Node>, ParseError> {
    let mut nodes = Vec::new();
    for pair in parse_program(code)? {
        nodes.push(construct_node(pair));
    }
    Ok(nodes)
}

/**
 * Top-level function for parsing a program into its clauses.
 */
pub fn parse(code: &str) -> Result<Vec<Clause>, ParseError> {
    let mut clauses = Vec::new();
    for pair in parse_program(code)? {
        clauses.push(construct_clause(pair)?);
    }
    tracing::debug!(clauses = clauses.len(), "parsed program");
    Ok(clauses)
}

fn parse_program(code: &str) -> Result<impl Iterator<Item = Pair<'_, Rule>>, ParseError> {
    let mut pairs = HornParser::parse(Rule::program, code)?;
    let program = pairs
        .next()
        .ok_or_else(|| ParseError::new((1, 1), "empty parse"))?;

    Ok(program
        .into_inner()
        .filter(|pair| pair.as_rule() != Rule::EOI))
}

fn construct_clause(pair: Pair<Rule>) -> Result<Clause, ParseError> {
    let line_col = pair.as_span().start_pos().line_col();
    if pair.as_rule() != Rule::list {
        return Err(ParseError::new(
            line_col,
            format!("expected a clause, found bare token {:?}", pair.as_str()),
        ));
    }

    let mut it = pair.into_inner();
    let head = match it.next() {
        Some(pair) => construct_call(pair)?,
        None => return Err(ParseError::new(line_col, "empty clause")),
    };

    let mut body = Vec::new();
    for pair in it {
        body.push(construct_call(pair)?);
    }

    Ok(Clause { head, body })
}

fn construct_call(pair: Pair<Rule>) -> Result<Call, ParseError> {
    let line_col = pair.as_span().start_pos().line_col();
    if pair.as_rule() != Rule::list {
        return Err(ParseError::new(
            line_col,
            format!("expected (relation arg...), found {:?}", pair.as_str()),
        ));
    }

    let mut it = pair.into_inner();
    let relation = match it.next().map(construct_node) {
        Some(Node::Symbol(name)) => name,
        Some(Node::Variable(name)) => {
            return Err(ParseError::new(
                line_col,
                format!("relation name {:?} must not be a variable", name),
            ))
        }
        Some(Node::List(_)) => {
            return Err(ParseError::new(line_col, "relation name must be a token"))
        }
        None => return Err(ParseError::new(line_col, "missing relation name")),
    };

    let args = it.map(construct_node).collect();
    Ok(Call { relation, args })
}

fn construct_node(pair: Pair<Rule>) -> Node {
    match pair.as_rule() {
        Rule::token => Node::token(pair.as_str()),
        Rule::list => Node::List(pair.into_inner().map(construct_node).collect()),
        _ => unreachable!(),
    }
}
