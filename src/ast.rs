/// A node of the parsed source: either a bare token or a parenthesized
/// sequence of nodes.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    // Token starting with an uppercase letter
    Variable(String),
    // Any other token
    Symbol(String),
    List(Vec<Node>),
}

/// `(name arg...)`, used both for clause heads and body goals.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub relation: String,
    pub args: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Clause {
    pub head: Call,
    pub body: Vec<Call>,
}

impl Node {
    pub fn token(text: &str) -> Self {
        if text.starts_with(|c: char| c.is_ascii_uppercase()) {
            Node::Variable(text.to_string())
        } else {
            Node::Symbol(text.to_string())
        }
    }

    /**
     * Calls `f` on every variable name in the node, depth first, left to
     * right. Names repeat as often as they occur.
     */
    pub fn for_each_variable<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            Node::Variable(name) => f(name),
            Node::Symbol(_) => (),
            Node::List(items) => {
                for item in items {
                    item.for_each_variable(f);
                }
            }
        }
    }
}

impl Call {
    pub fn for_each_variable<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        for arg in &self.args {
            arg.for_each_variable(f);
        }
    }
}

impl Clause {
    pub fn for_each_variable<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        self.head.for_each_variable(f);
        for goal in &self.body {
            goal.for_each_variable(f);
        }
    }
}
