use super::{Expression, Span};

/// The contents of a file or of a block: attributes and nested blocks in
/// source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Body {
    pub structures: Vec<Structure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Structure {
    Attribute(Attribute),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: Expression,
    /// From the first byte of the key to the last byte of the value.
    pub span: Span,
    pub value_span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub ident: String,
    pub labels: Vec<BlockLabel>,
    pub body: Body,
    /// From the first byte of the identifier to the closing brace.
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLabel {
    pub value: String,
    pub span: Span,
}

impl Body {
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.structures.iter().filter_map(|s| match s {
            Structure::Attribute(attr) => Some(attr),
            Structure::Block(_) => None,
        })
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.structures.iter().filter_map(|s| match s {
            Structure::Block(block) => Some(block),
            Structure::Attribute(_) => None,
        })
    }

    pub fn get_attribute(&self, key: &str) -> Option<&Attribute> {
        self.attributes().find(|attr| attr.key == key)
    }

    pub fn get_blocks<'a>(&'a self, ident: &'a str) -> impl Iterator<Item = &'a Block> {
        self.blocks().filter(move |block| block.ident == ident)
    }
}

impl Block {
    /// The type label of a `resource "<type>" "<name>"` block.
    pub fn resource_type(&self) -> Option<&BlockLabel> {
        if self.ident == "resource" {
            self.labels.first()
        } else {
            None
        }
    }

    pub fn resource_name(&self) -> Option<&str> {
        if self.ident == "resource" {
            self.labels.get(1).map(|label| label.value.as_str())
        } else {
            None
        }
    }
}
