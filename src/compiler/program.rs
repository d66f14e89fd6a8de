//! Node tree built from scanned instructions, and its interpreter.

use super::expr::{parse_expression, parse_statement, BinaryOperator, Expression, Statement, UnaryOperator};
use super::scanner::Instruction;
use super::value;
use super::{Imports, Template};
use crate::error::{Error, Result};
use crate::locals::Locals;
use log::trace;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Emit(Expression),
    EmitEscaped(Expression),
    Assign { target: String, value: Expression },
    Eval(Expression),
    If { branches: Vec<(Expression, Vec<Node>)>, otherwise: Vec<Node> },
    For { item: String, key: Option<String>, iterable: Expression, body: Vec<Node> },
}

enum Item {
    Node(Node),
    Statement(Statement),
}

/// A compiled template: the parsed node tree plus the name of the context
/// binding it was compiled with.
#[derive(Debug, Clone)]
pub struct Program {
    nodes: Vec<Node>,
    context_name: String,
}

impl Program {
    /// Parses every instruction and nests block statements.
    ///
    /// Unbalanced blocks (`end` without `if`, `if` without `end`, `else`
    /// inside a loop) fail with [`Error::Syntax`].
    pub fn build(instructions: Vec<Instruction>, context_name: &str) -> Result<Self> {
        let mut items = instructions
            .into_iter()
            .map(|instruction| -> Result<Item> {
                Ok(match instruction {
                    Instruction::Literal(text) => Item::Node(Node::Text(text)),
                    Instruction::Emit(code) => Item::Node(Node::Emit(parse_expression(&code)?)),
                    Instruction::EmitEscaped(code) => {
                        Item::Node(Node::EmitEscaped(parse_expression(&code)?))
                    }
                    Instruction::Statement(code) => {
                        Item::Statement(parse_statement(&code, context_name)?)
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?
            .into_iter();

        let (nodes, terminator) = block(&mut items)?;
        if let Some(statement) = terminator {
            return Err(Error::Syntax(format!("unexpected {} outside of a block", describe(&statement))));
        }

        Ok(Self { nodes, context_name: context_name.to_string() })
    }
}

fn describe(statement: &Statement) -> &'static str {
    match statement {
        Statement::Else => "'else'",
        Statement::ElseIf(_) => "'else if'",
        Statement::End => "'end'",
        _ => "statement",
    }
}

/// Collects nodes until a block terminator (`else`, `else if`, `end`) or
/// the end of input, returning whichever stopped it.
fn block(items: &mut impl Iterator<Item = Item>) -> Result<(Vec<Node>, Option<Statement>)> {
    let mut nodes = Vec::new();
    while let Some(item) = items.next() {
        let statement = match item {
            Item::Node(node) => {
                nodes.push(node);
                continue;
            }
            Item::Statement(statement) => statement,
        };

        match statement {
            Statement::If(condition) => nodes.push(if_block(condition, items)?),
            Statement::For { item, key, iterable } => {
                let (body, terminator) = block(items)?;
                match terminator {
                    Some(Statement::End) => {}
                    Some(other) => {
                        return Err(Error::Syntax(format!("unexpected {} inside a for loop", describe(&other))))
                    }
                    None => return Err(Error::Syntax(format!("unclosed for loop over '{item}'"))),
                }
                nodes.push(Node::For { item, key, iterable, body });
            }
            Statement::Assign { target, value } => nodes.push(Node::Assign { target, value }),
            Statement::Eval(expression) => nodes.push(Node::Eval(expression)),
            terminator @ (Statement::Else | Statement::ElseIf(_) | Statement::End) => {
                return Ok((nodes, Some(terminator)))
            }
        }
    }
    Ok((nodes, None))
}

fn if_block(condition: Expression, items: &mut impl Iterator<Item = Item>) -> Result<Node> {
    let mut branches = Vec::new();
    let mut condition = condition;
    loop {
        let (body, terminator) = block(items)?;
        branches.push((condition, body));
        match terminator {
            Some(Statement::ElseIf(next)) => condition = next,
            Some(Statement::Else) => {
                let (otherwise, terminator) = block(items)?;
                return match terminator {
                    Some(Statement::End) => Ok(Node::If { branches, otherwise }),
                    Some(other) => Err(Error::Syntax(format!("unexpected {} after 'else'", describe(&other)))),
                    None => Err(Error::Syntax("unclosed if block".to_string())),
                };
            }
            Some(Statement::End) => return Ok(Node::If { branches, otherwise: Vec::new() }),
            _ => return Err(Error::Syntax("unclosed if block".to_string())),
        }
    }
}

impl Template for Program {
    fn render(&self, locals: &mut Locals, imports: &dyn Imports) -> Result<String> {
        let mut interpreter = Interpreter { locals, imports, context_name: &self.context_name };
        let mut output = String::new();
        interpreter.run(&self.nodes, &mut output)?;
        Ok(output)
    }
}

struct Interpreter<'a> {
    locals: &'a mut Locals,
    imports: &'a dyn Imports,
    context_name: &'a str,
}

impl Interpreter<'_> {
    fn run(&mut self, nodes: &[Node], output: &mut String) -> Result<()> {
        for node in nodes {
            match node {
                Node::Text(text) => output.push_str(text),
                Node::Emit(expression) => {
                    if let Some(text) = value::to_output(&self.evaluate(expression)?) {
                        output.push_str(&text);
                    }
                }
                Node::EmitEscaped(expression) => {
                    if let Some(text) = value::to_output(&self.evaluate(expression)?) {
                        output.push_str(&value::escape_html(&text));
                    }
                }
                Node::Assign { target, value } => {
                    let value = self.evaluate(value)?;
                    self.locals.insert(target.as_str(), value);
                }
                Node::Eval(expression) => {
                    self.evaluate(expression)?;
                }
                Node::If { branches, otherwise } => {
                    let mut taken = None;
                    for (condition, body) in branches {
                        if value::is_truthy(&self.evaluate(condition)?) {
                            taken = Some(body);
                            break;
                        }
                    }
                    self.run(taken.unwrap_or(otherwise), output)?;
                }
                Node::For { item, key, iterable, body } => {
                    self.run_loop(item, key.as_deref(), iterable, body, output)?;
                }
            }
        }
        Ok(())
    }

    fn run_loop(
        &mut self,
        item: &str,
        key: Option<&str>,
        iterable: &Expression,
        body: &[Node],
        output: &mut String,
    ) -> Result<()> {
        let entries: Vec<(Value, Value)> = match self.evaluate(iterable)? {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, element)| (Value::from(index), element))
                .collect(),
            Value::Object(map) => map.into_iter().map(|(k, v)| (Value::String(k), v)).collect(),
            Value::Null => Vec::new(),
            other => {
                return Err(Error::Evaluation(format!("cannot iterate over {other}")));
            }
        };

        let saved_item = self.locals.get(item).cloned();
        let saved_key = key.map(|key| (key, self.locals.get(key).cloned()));

        let mut result = Ok(());
        for (k, element) in entries {
            self.locals.insert(item, element);
            if let Some(key) = key {
                self.locals.insert(key, k);
            }
            result = self.run(body, output);
            if result.is_err() {
                break;
            }
        }

        restore(self.locals, item, saved_item);
        if let Some((key, saved)) = saved_key {
            restore(self.locals, key, saved);
        }
        result
    }

    fn evaluate(&mut self, expression: &Expression) -> Result<Value> {
        match expression {
            Expression::Literal(value) => Ok(value.clone()),
            Expression::Variable(name) if name == self.context_name => Ok(self.locals.to_value()),
            Expression::Variable(name) => Ok(self.locals.get(name).cloned().unwrap_or(Value::Null)),
            Expression::Member { object, property } => {
                let property = self.evaluate(property)?;
                // `$.key` reads straight from the locals instead of snapshotting them.
                if matches!(object.as_ref(), Expression::Variable(name) if name == self.context_name) {
                    let key = value::to_display(&property);
                    return Ok(self.locals.get(&key).cloned().unwrap_or(Value::Null));
                }
                let object = self.evaluate(object)?;
                Ok(value::member(&object, &property))
            }
            Expression::Call { callee, args } => {
                let name = self.callee_name(callee)?;
                let args = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<_>>>()?;
                trace!("Calling import '{name}' with {} argument(s)", args.len());
                self.imports.call(&name, &args, self.locals)
            }
            Expression::Array(items) => Ok(Value::Array(
                items.iter().map(|item| self.evaluate(item)).collect::<Result<_>>()?,
            )),
            Expression::Unary { op, operand } => {
                let operand = self.evaluate(operand)?;
                match op {
                    UnaryOperator::Not => Ok(Value::Bool(!value::is_truthy(&operand))),
                    UnaryOperator::Neg => Ok(value::number(-value::as_number(&operand, "-")?)),
                }
            }
            Expression::Binary { left, op, right } => self.binary(left, *op, right),
            Expression::Conditional { condition, then, otherwise } => {
                if value::is_truthy(&self.evaluate(condition)?) {
                    self.evaluate(then)
                } else {
                    self.evaluate(otherwise)
                }
            }
        }
    }

    fn binary(&mut self, left: &Expression, op: BinaryOperator, right: &Expression) -> Result<Value> {
        let left = self.evaluate(left)?;
        match op {
            BinaryOperator::And if !value::is_truthy(&left) => return Ok(left),
            BinaryOperator::Or if value::is_truthy(&left) => return Ok(left),
            BinaryOperator::Nullish if !left.is_null() => return Ok(left),
            BinaryOperator::And | BinaryOperator::Or | BinaryOperator::Nullish => {
                return self.evaluate(right)
            }
            _ => {}
        }

        let right = self.evaluate(right)?;
        match op {
            BinaryOperator::Add => value::add(&left, &right),
            BinaryOperator::Sub => value::arithmetic("-", &left, &right),
            BinaryOperator::Mul => value::arithmetic("*", &left, &right),
            BinaryOperator::Div => value::arithmetic("/", &left, &right),
            BinaryOperator::Rem => value::arithmetic("%", &left, &right),
            BinaryOperator::Eq => Ok(Value::Bool(value::loose_eq(&left, &right))),
            BinaryOperator::NotEq => Ok(Value::Bool(!value::loose_eq(&left, &right))),
            BinaryOperator::Lt => value::compare("<", &left, &right).map(Value::Bool),
            BinaryOperator::Le => value::compare("<=", &left, &right).map(Value::Bool),
            BinaryOperator::Gt => value::compare(">", &left, &right).map(Value::Bool),
            BinaryOperator::Ge => value::compare(">=", &left, &right).map(Value::Bool),
            BinaryOperator::And | BinaryOperator::Or | BinaryOperator::Nullish => Ok(right),
        }
    }

    /// Only `name(...)` and `$.name(...)` are callable; both dispatch to imports.
    fn callee_name(&self, callee: &Expression) -> Result<String> {
        match callee {
            Expression::Variable(name) if name != self.context_name => Ok(name.clone()),
            Expression::Member { object, property } => match (object.as_ref(), property.as_ref()) {
                (Expression::Variable(ctx), Expression::Literal(Value::String(name)))
                    if ctx == self.context_name =>
                {
                    Ok(name.clone())
                }
                _ => Err(Error::Evaluation(format!("{callee:?} is not a function"))),
            },
            _ => Err(Error::Evaluation(format!("{callee:?} is not a function"))),
        }
    }
}

fn restore(locals: &mut Locals, key: &str, saved: Option<Value>) {
    match saved {
        Some(value) => {
            locals.insert(key, value);
        }
        None => {
            locals.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::scanner::scan;
    use crate::compiler::settings::CompilerSettings;
    use serde_json::json;

    struct Upper;

    impl Imports for Upper {
        fn call(&self, name: &str, args: &[Value], locals: &mut Locals) -> Result<Value> {
            match name {
                "upper" => Ok(json!(value::to_display(&args[0]).to_uppercase())),
                "mark" => {
                    locals.insert("marked", true);
                    Ok(Value::Null)
                }
                _ => Err(Error::Evaluation(format!("unknown import '{name}'"))),
            }
        }
    }

    fn render(source: &str, locals: serde_json::Value) -> Result<String> {
        let settings = CompilerSettings::default();
        let program = Program::build(scan(source, &settings), settings.context_name())?;
        let mut locals = Locals::from_value(locals)?;
        program.render(&mut locals, &Upper)
    }

    #[test]
    fn interpolates_and_skips_null() {
        let out = render("Hi {{ name }}{{ missing }}{{ $.name }}!", json!({"name": "Ann"})).unwrap();
        assert_eq!(out, "Hi AnnAnn!");
    }

    #[test]
    fn runs_conditionals() {
        let source = "<< if n > 1 >>many<< else if n == 1 >>one<< else >>none<< end >>";
        assert_eq!(render(source, json!({"n": 3})).unwrap(), "many");
        assert_eq!(render(source, json!({"n": 1})).unwrap(), "one");
        assert_eq!(render(source, json!({"n": 0})).unwrap(), "none");
    }

    #[test]
    fn runs_brace_style_blocks() {
        let source = "<< if ($.on) { >>yes<< } else { >>no<< } >>";
        assert_eq!(render(source, json!({"on": true})).unwrap(), "yes");
        assert_eq!(render(source, json!({})).unwrap(), "no");
    }

    #[test]
    fn loops_and_restores_variables() {
        let source = "<< for p, i in planets >>{{ i }}:{{ p.name }} << end >>{{ p }}";
        let out = render(source, json!({"p": "kept", "planets": [{"name": "a"}, {"name": "b"}]})).unwrap();
        assert_eq!(out, "0:a 1:b kept");
    }

    #[test]
    fn loops_over_object_entries() {
        let out = render("<< for v, k in obj >>{{ k }}={{ v }};<< end >>", json!({"obj": {"x": 1, "y": 2}})).unwrap();
        assert_eq!(out, "x=1;y=2;");
    }

    #[test]
    fn assignments_write_locals() {
        let out = render("<< let x = 2 * 3 >><< $.y = x + 1 >>{{ x }} {{ y }}", json!({})).unwrap();
        assert_eq!(out, "6 7");
    }

    #[test]
    fn calls_dispatch_to_imports() {
        let out = render("{{ upper(name) }} {{ $.upper('b') }}<< mark() >>{{ marked }}", json!({"name": "a"})).unwrap();
        assert_eq!(out, "A Btrue");
    }

    #[test]
    fn logical_operators_return_operands() {
        let out = render("{{ a || 'fallback' }} {{ b ?? 'none' }} {{ a && 'x' }}", json!({"a": ""})).unwrap();
        assert_eq!(out, "fallback none ");
    }

    #[test]
    fn unbalanced_blocks_are_syntax_errors() {
        assert!(matches!(render("<< if a >>x", json!({})), Err(Error::Syntax(_))));
        assert!(matches!(render("x<< end >>", json!({})), Err(Error::Syntax(_))));
        assert!(matches!(render("<< for a in b >><< else >><< end >>", json!({})), Err(Error::Syntax(_))));
    }

    #[test]
    fn runtime_failures_are_evaluation_errors() {
        assert!(matches!(render("{{ nope() }}", json!({})), Err(Error::Evaluation(_))));
        assert!(matches!(render("<< for x in 3 >><< end >>", json!({})), Err(Error::Evaluation(_))));
    }
}
