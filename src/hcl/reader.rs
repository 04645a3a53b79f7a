use super::{
    Attribute, Block, BlockLabel, Body, Document, Expression, ObjectItem, Reference, Span,
    Structure,
};
use hcl_edit::Span as _;
use hcl_edit::expr::{self as ast, ObjectKey, TraversalOperator};
use hcl_edit::structure as tree;
use hcl_edit::visit::{self, Visit};
use std::ops::Range;

pub(super) fn read_document(src: &str, parsed: &tree::Body) -> Document {
    let reader = Reader { src };
    let mut references = ReferenceCollector {
        reader: &reader,
        references: Vec::new(),
    };
    references.visit_body(parsed);

    let mut references = references.references;
    references.sort_by_key(|reference| reference.span.start);
    Document {
        body: reader.body(parsed),
        references,
    }
}

struct Reader<'a> {
    src: &'a str,
}

impl Reader<'_> {
    /// Converts a node span, trimmed to the node's own text.
    fn span(&self, range: Option<Range<usize>>) -> Span {
        let Some((range, text)) = range.and_then(|r| self.src.get(r.clone()).map(|t| (r, t)))
        else {
            return Span::default();
        };
        let start = range.start + (text.len() - text.trim_start().len());
        let end = range.end - (text.len() - text.trim_end().len());
        Span::new(start, end.max(start))
    }

    /// Widens a string literal span to include its quotes.
    fn quoted(&self, span: Span) -> Span {
        let bytes = self.src.as_bytes();
        let quote_at = |i: usize| bytes.get(i) == Some(&b'"');
        if quote_at(span.start) || span.start == 0 {
            return span;
        }
        if quote_at(span.start - 1) && quote_at(span.end) {
            Span::new(span.start - 1, span.end + 1)
        } else {
            span
        }
    }

    fn text(&self, expr: &ast::Expression) -> String {
        self.span(expr.span()).slice(self.src).to_string()
    }

    fn body(&self, body: &tree::Body) -> Body {
        Body {
            structures: body.iter().map(|s| self.structure(s)).collect(),
        }
    }

    fn structure(&self, structure: &tree::Structure) -> Structure {
        match structure {
            tree::Structure::Attribute(attr) => Structure::Attribute(self.attribute(attr)),
            tree::Structure::Block(block) => Structure::Block(self.block(block)),
        }
    }

    fn attribute(&self, attr: &tree::Attribute) -> Attribute {
        let key_span = self.span(attr.key.span());
        let value_span = self.span(attr.value.span());
        Attribute {
            key: attr.key.value().as_str().to_string(),
            value: self.expression(&attr.value),
            span: Span::new(key_span.start, value_span.end),
            value_span,
        }
    }

    fn block(&self, block: &tree::Block) -> Block {
        let start = self.span(block.ident.span()).start;
        // Ends at the closing brace, never at trailing decor.
        let end = block
            .span()
            .and_then(|range| self.src.get(..range.end))
            .and_then(|text| text.rfind('}'))
            .map_or(start, |i| i + 1);
        Block {
            ident: block.ident.value().as_str().to_string(),
            labels: block.labels.iter().map(|label| self.label(label)).collect(),
            body: self.body(&block.body),
            span: Span::new(start, end.max(start)),
        }
    }

    fn label(&self, label: &tree::BlockLabel) -> BlockLabel {
        match label {
            tree::BlockLabel::Ident(ident) => BlockLabel {
                value: ident.value().as_str().to_string(),
                span: self.span(ident.span()),
            },
            tree::BlockLabel::String(string) => BlockLabel {
                value: string.value().clone(),
                span: self.quoted(self.span(string.span())),
            },
        }
    }

    fn expression(&self, expr: &ast::Expression) -> Expression {
        match expr {
            ast::Expression::Null(_) => Expression::Null,
            ast::Expression::Bool(b) => Expression::Bool(*b.value()),
            ast::Expression::Number(_) => Expression::Number(self.text(expr)),
            ast::Expression::String(s) => Expression::String(s.value().clone()),
            ast::Expression::Array(array) => {
                Expression::Tuple(array.iter().map(|item| self.expression(item)).collect())
            }
            ast::Expression::Object(object) => self.object(expr, object),
            ast::Expression::StringTemplate(_) => Expression::Template(self.text(expr)),
            // `-2` arrives as a negation of `2`.
            ast::Expression::UnaryOp(_) if self.text(expr).parse::<f64>().is_ok() => {
                Expression::Number(self.text(expr))
            }
            _ => Expression::Raw(self.text(expr)),
        }
    }

    fn object(&self, expr: &ast::Expression, object: &ast::Object) -> Expression {
        let mut items = Vec::new();
        for (key, value) in object.iter() {
            let key = match key {
                ObjectKey::Ident(ident) => ident.value().as_str().to_string(),
                ObjectKey::Expression(ast::Expression::String(s)) => s.value().clone(),
                // Computed keys make the whole object opaque.
                _ => return Expression::Raw(self.text(expr)),
            };
            items.push(ObjectItem {
                key,
                value: self.expression(value.expr()),
            });
        }
        Expression::Object(items)
    }
}

/// Collects `<root>.<name>` traversals, including those inside string and
/// heredoc templates.
struct ReferenceCollector<'a> {
    reader: &'a Reader<'a>,
    references: Vec<Reference>,
}

impl Visit for ReferenceCollector<'_> {
    fn visit_traversal(&mut self, node: &ast::Traversal) {
        if let (ast::Expression::Variable(root), Some(first)) =
            (&node.expr, node.operators.first())
        {
            if let TraversalOperator::GetAttr(name) = first.value() {
                let span = self.reader.span(root.span());
                let root = root.value().as_str();
                if span.slice(self.reader.src) == root {
                    self.references.push(Reference {
                        root: root.to_string(),
                        name: name.value().as_str().to_string(),
                        span,
                    });
                }
            }
        }
        visit::visit_traversal(self, node);
    }
}
