use std::fmt;

/// Primitive type tags. These are nominal atoms compared by exact tag
/// equality; `any` and `void` are ordinary tags, not top or bottom types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    Number,
    String,
    Boolean,
    Undefined,
    Any,
    Void,
}

impl Primitive {
    pub fn from_name(name: &str) -> Option<Primitive> {
        match name {
            "number" => Some(Primitive::Number),
            "string" => Some(Primitive::String),
            "boolean" => Some(Primitive::Boolean),
            "undefined" => Some(Primitive::Undefined),
            "any" => Some(Primitive::Any),
            "void" => Some(Primitive::Void),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Number => "number",
            Primitive::String => "string",
            Primitive::Boolean => "boolean",
            Primitive::Undefined => "undefined",
            Primitive::Any => "any",
            Primitive::Void => "void",
        }
    }
}

/// A type expression. Parsed annotations may contain `Named` references;
/// the resolver replaces those with one of the five structural shapes, so
/// types flowing through the checker are never `Named`.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeExpr {
    Prim(Primitive),
    Function {
        params: Vec<TypeExpr>,
        ret: Box<TypeExpr>,
    },
    Union(Vec<TypeExpr>),
    Object(Vec<(String, TypeExpr)>),
    Array(Box<TypeExpr>),
    Named(String),
}

impl TypeExpr {
    pub fn any() -> TypeExpr {
        TypeExpr::Prim(Primitive::Any)
    }

    pub fn number() -> TypeExpr {
        TypeExpr::Prim(Primitive::Number)
    }

    pub fn boolean() -> TypeExpr {
        TypeExpr::Prim(Primitive::Boolean)
    }

    pub fn undefined() -> TypeExpr {
        TypeExpr::Prim(Primitive::Undefined)
    }

    pub fn is_prim(&self, prim: Primitive) -> bool {
        matches!(self, TypeExpr::Prim(tag) if *tag == prim)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Prim(prim) => write!(f, "{}", prim.name()),
            TypeExpr::Function { params, ret } => {
                write!(f, "(")?;
                for (idx, param) in params.iter().enumerate() {
                    if idx != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") => {ret}")
            }
            TypeExpr::Union(members) => {
                for (idx, member) in members.iter().enumerate() {
                    if idx != 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            TypeExpr::Object(props) => {
                write!(f, "{{")?;
                for (idx, (name, ty)) in props.iter().enumerate() {
                    if idx != 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {name}: {ty}")?;
                }
                if props.is_empty() {
                    write!(f, "}}")
                } else {
                    write!(f, " }}")
                }
            }
            TypeExpr::Array(elem) => match elem.as_ref() {
                TypeExpr::Union(_) | TypeExpr::Function { .. } => write!(f, "({elem})[]"),
                _ => write!(f, "{elem}[]"),
            },
            TypeExpr::Named(name) => write!(f, "{name}"),
        }
    }
}
