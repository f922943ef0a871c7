use tabql_core::Value;

/// A minimal expression shape sufficient to drive control flow
/// (IF/CASE/WHILE predicates, RETURN values, PRINT/PRINTF arguments,
/// prompt `` `<expr>` `` segments). Scalar/aggregate function bodies and
/// relational subqueries are evaluated by the external operators, not
/// here.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Value),
    Variable(String),
    EnvVar(String),
    Not(Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Equal(Box<Expression>, Box<Expression>),
    Less(Box<Expression>, Box<Expression>),
    /// A fully opaque query expression handed to an external evaluator —
    /// the prompt tokenizer and the relational operators both accept
    /// these without this crate knowing their grammar.
    Raw(String),
}
