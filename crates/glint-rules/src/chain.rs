//! Chain flattening
//!
//! `xs.Append(a).Prepend(b).Concat(ys)` builds a sequence one call at a
//! time. The same sequence as a collection literal is `[b, ..xs, a, ..ys]`.
//!
//! Flattening works in three steps:
//!
//! 1. [`SyntaxChain::collect`] walks the receiver chain from the outermost
//!    link inward and stops at the first call that is not a link.
//! 2. [`flatten`] turns the links (outermost first) plus the innermost
//!    receiver into ordered elements. Links are pushed on a stack and popped
//!    back off, so evaluation order is restored; a `Prepend` goes to the
//!    front, everything else to the back. Repeated prepends therefore come
//!    out in reverse call order, as they do at run time.
//! 3. [`render_collection`] prints the elements, moving comments and line
//!    breaks from the chain to the list.
//!
//! Steps 2 and 3 are pure and generic over the element payload.

use std::collections::VecDeque;

use glint_core::cst::ast::{AstNode, Expr, Invocation};
use glint_core::cst::trivia::{
    Trivia, contains_comment, contains_newline, indentation, leading_trivia, node_trailing_trivia,
    render, trim_start_whitespace,
};

/// A chain call that adds to the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Append,
    Prepend,
    Concat,
}

impl LinkKind {
    pub fn from_method_name(name: &str) -> Option<Self> {
        match name {
            "Append" => Some(Self::Append),
            "Prepend" => Some(Self::Prepend),
            "Concat" => Some(Self::Concat),
            _ => None,
        }
    }

    pub fn position(self) -> Position {
        match self {
            Self::Prepend => Position::Head,
            Self::Append | Self::Concat => Position::Tail,
        }
    }

    fn element<T>(self, argument: T) -> CollectionElement<T> {
        match self {
            Self::Concat => CollectionElement::Spread(argument),
            Self::Append | Self::Prepend => CollectionElement::Value(argument),
        }
    }
}

/// Where a popped element is inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Head,
    Tail,
}

/// An item of a collection literal
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CollectionElement<T> {
    /// A single value
    Value(T),
    /// All items of a sequence, written `..seq`
    Spread(T),
}

impl<T> CollectionElement<T> {
    pub fn inner(&self) -> &T {
        match self {
            Self::Value(inner) | Self::Spread(inner) => inner,
        }
    }

    pub fn is_spread(&self) -> bool {
        matches!(self, Self::Spread(_))
    }
}

/// One call of the chain with the trivia around it
///
/// `leading` is the trivia before the link's `.`; `trailing` is the trivia
/// after its closing parenthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink<T> {
    pub kind: LinkKind,
    pub argument: T,
    pub leading: Vec<Trivia>,
    pub trailing: Vec<Trivia>,
}

/// A flattened element with the trivia it carried in the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainElement<T> {
    pub element: CollectionElement<T>,
    pub leading: Vec<Trivia>,
    pub trailing: Vec<Trivia>,
}

/// Order the links of a chain as collection elements
///
/// `links` are outermost first, i.e. in the order a walk from the
/// materializing call inward meets them. The receiver becomes a spread.
pub fn flatten<T>(
    links: Vec<ChainLink<T>>,
    receiver: T,
    receiver_trailing: Vec<Trivia>,
) -> Vec<ChainElement<T>> {
    let mut stack: Vec<(Position, ChainElement<T>)> = links
        .into_iter()
        .map(|link| {
            (
                link.kind.position(),
                ChainElement {
                    element: link.kind.element(link.argument),
                    leading: link.leading,
                    trailing: link.trailing,
                },
            )
        })
        .collect();
    stack.push((
        Position::Tail,
        ChainElement {
            element: CollectionElement::Spread(receiver),
            leading: Vec::new(),
            trailing: receiver_trailing,
        },
    ));

    let mut ordered = VecDeque::with_capacity(stack.len());
    while let Some((position, element)) = stack.pop() {
        match position {
            Position::Head => ordered.push_front(element),
            Position::Tail => ordered.push_back(element),
        }
    }
    ordered.into()
}

/// Indentation used when the list spans several lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    /// Indentation of elements that start a line
    pub continuation_indent: String,
    /// Indentation of a `]` that starts a line
    pub closing_indent: String,
}

/// Print elements as a collection literal
///
/// Separators keep the line breaks and comments that followed an element in
/// the chain. An element starting a line keeps its own comments, or gets the
/// continuation indent. Whitespace-only trivia at either end of the list is
/// dropped.
pub fn render_collection<T>(
    elements: &[ChainElement<T>],
    text: impl Fn(&T) -> String,
    layout: &Layout,
) -> String {
    let mut out = String::from("[");
    for (i, current) in elements.iter().enumerate() {
        match i.checked_sub(1).map(|p| &elements[p]) {
            None => {
                if contains_comment(&current.leading) {
                    out.push_str(&render(&trim_start_whitespace(&current.leading)));
                }
            }
            Some(previous) => {
                out.push(',');
                if contains_comment(&previous.trailing) {
                    out.push_str(&render(&previous.trailing));
                } else if contains_newline(&previous.trailing) {
                    out.push('\n');
                }
                if contains_newline(&previous.trailing) {
                    if contains_comment(&current.leading) {
                        out.push_str(&render(&current.leading));
                    } else {
                        out.push_str(&layout.continuation_indent);
                    }
                } else if !out.ends_with(' ') {
                    out.push(' ');
                }
            }
        }
        if current.element.is_spread() {
            out.push_str("..");
        }
        out.push_str(&text(current.element.inner()));
    }
    if let Some(last) = elements.last()
        && contains_comment(&last.trailing)
    {
        out.push_str(&render(&last.trailing));
        if contains_newline(&last.trailing) {
            out.push_str(&layout.closing_indent);
        }
    }
    out.push(']');
    out
}

/// A link call found in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLink {
    pub kind: LinkKind,
    pub call: Invocation,
    pub argument: Expr,
}

/// The links below a materializing call, outermost first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxChain {
    pub links: Vec<RawLink>,
    /// What the innermost link is called on
    pub receiver: Expr,
}

impl SyntaxChain {
    /// Walk inward from `start`, the receiver of the materializing call
    ///
    /// Returns `None` when no link was found, or when a link does not have
    /// exactly one plain argument.
    pub fn collect(start: Expr) -> Option<Self> {
        let mut links = Vec::new();
        let mut current = start;
        loop {
            let Some(call) = Invocation::cast(current.syntax().clone()) else {
                break;
            };
            let Some(kind) = call.method_name().as_deref().and_then(LinkKind::from_method_name)
            else {
                break;
            };
            let Some(receiver) = call.receiver() else {
                break;
            };
            let args = call.args();
            let [arg] = args.as_slice() else {
                return None;
            };
            if arg.ref_kind().is_some() {
                return None;
            }
            let argument = arg.expr()?;
            links.push(RawLink {
                kind,
                call,
                argument,
            });
            current = receiver;
        }
        (!links.is_empty()).then_some(Self {
            links,
            receiver: current,
        })
    }

    /// Keep the outermost `count` links; the rest become the receiver
    pub fn truncate(mut self, count: usize) -> Option<Self> {
        if count == 0 || count > self.links.len() {
            return None;
        }
        if count < self.links.len() {
            self.receiver = self.links[count - 1].call.receiver()?;
            self.links.truncate(count);
        }
        Some(self)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Links with their trivia, ready for [`flatten`]
    pub fn chain_links(&self) -> Vec<ChainLink<Expr>> {
        self.links
            .iter()
            .map(|link| ChainLink {
                kind: link.kind,
                argument: link.argument.clone(),
                leading: link
                    .call
                    .member_access()
                    .and_then(|m| m.dot_token())
                    .map(|dot| leading_trivia(&dot))
                    .unwrap_or_default(),
                trailing: node_trailing_trivia(link.call.syntax()),
            })
            .collect()
    }

    /// Flattened elements of the whole chain
    pub fn elements(&self) -> Vec<ChainElement<Expr>> {
        flatten(
            self.chain_links(),
            self.receiver.clone(),
            node_trailing_trivia(self.receiver.syntax()),
        )
    }

    /// Indentation of the first link that starts a line
    pub fn continuation_indent(&self) -> String {
        self.links
            .iter()
            .rev()
            .filter_map(|link| link.call.member_access()?.dot_token())
            .map(|dot| indentation(&leading_trivia(&dot)))
            .find(|indent| !indent.is_empty())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::SyntaxTree;
    use glint_core::cst::trivia::trimmed_text;

    fn link(kind: LinkKind, argument: &str) -> ChainLink<&str> {
        ChainLink {
            kind,
            argument,
            leading: Vec::new(),
            trailing: Vec::new(),
        }
    }

    fn plain(elements: &[ChainElement<&str>]) -> String {
        render_collection(elements, |s| s.to_string(), &Layout::default())
    }

    #[test]
    fn test_append_then_prepend() {
        // base.Append(2).Prepend(3), outermost first
        let links = vec![link(LinkKind::Prepend, "3"), link(LinkKind::Append, "2")];
        let elements = flatten(links, "base", Vec::new());
        assert_eq!(plain(&elements), "[3, ..base, 2]");
    }

    #[test]
    fn test_repeated_prepends_reverse() {
        // xs.Prepend(1).Prepend(2).Prepend(3) evaluates to 3, 2, 1, xs...
        let links = vec![
            link(LinkKind::Prepend, "3"),
            link(LinkKind::Prepend, "2"),
            link(LinkKind::Prepend, "1"),
        ];
        assert_eq!(plain(&flatten(links, "xs", Vec::new())), "[3, 2, 1, ..xs]");
    }

    #[test]
    fn test_concat_is_spread() {
        let links = vec![link(LinkKind::Concat, "ys"), link(LinkKind::Append, "0")];
        assert_eq!(plain(&flatten(links, "xs", Vec::new())), "[..xs, 0, ..ys]");
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Append(i32),
        Prepend(i32),
        Concat(i32),
    }

    fn sequence(id: i32) -> Vec<i32> {
        vec![id * 100, id * 100 + 1]
    }

    fn evaluate_chain(ops: &[Op]) -> Vec<i32> {
        let mut seq = sequence(0);
        for op in ops {
            match *op {
                Op::Append(v) => seq.push(v),
                Op::Prepend(v) => seq.insert(0, v),
                Op::Concat(id) => seq.extend(sequence(id)),
            }
        }
        seq
    }

    fn evaluate_literal(elements: &[ChainElement<i32>]) -> Vec<i32> {
        elements
            .iter()
            .flat_map(|e| match e.element {
                CollectionElement::Value(v) => vec![v],
                CollectionElement::Spread(id) => sequence(id),
            })
            .collect()
    }

    fn all_chains(max_len: usize) -> Vec<Vec<Op>> {
        let mut out = vec![Vec::new()];
        let mut frontier = vec![Vec::new()];
        for _ in 0..max_len {
            let mut next = Vec::new();
            for chain in &frontier {
                let n = chain.len() as i32 + 1;
                for op in [Op::Append(n), Op::Prepend(n), Op::Concat(n)] {
                    let mut extended: Vec<Op> = chain.clone();
                    extended.push(op);
                    next.push(extended);
                }
            }
            out.extend(next.iter().cloned());
            frontier = next;
        }
        out.retain(|c| !c.is_empty());
        out
    }

    #[test]
    fn test_flatten_preserves_evaluation_order() {
        for ops in all_chains(5) {
            // call order is innermost first; links are outermost first
            let links: Vec<ChainLink<i32>> = ops
                .iter()
                .rev()
                .map(|op| {
                    let (kind, argument) = match *op {
                        Op::Append(v) => (LinkKind::Append, v),
                        Op::Prepend(v) => (LinkKind::Prepend, v),
                        Op::Concat(id) => (LinkKind::Concat, id),
                    };
                    ChainLink {
                        kind,
                        argument,
                        leading: Vec::new(),
                        trailing: Vec::new(),
                    }
                })
                .collect();
            let elements = flatten(links, 0, Vec::new());
            assert_eq!(elements.len(), ops.len() + 1, "{ops:?}");
            assert_eq!(evaluate_literal(&elements), evaluate_chain(&ops), "{ops:?}");
        }
    }

    #[test]
    fn test_render_keeps_comments_and_breaks() {
        let elements = vec![
            ChainElement {
                element: CollectionElement::Value("2"),
                leading: vec![Trivia::whitespace("    ")],
                trailing: vec![Trivia::newline()],
            },
            ChainElement {
                element: CollectionElement::Spread("xs"),
                leading: Vec::new(),
                trailing: vec![Trivia::newline()],
            },
            ChainElement {
                element: CollectionElement::Value("1"),
                leading: vec![Trivia::whitespace("    ")],
                trailing: vec![
                    Trivia::whitespace(" "),
                    Trivia::comment("// one"),
                    Trivia::newline(),
                ],
            },
        ];
        let layout = Layout {
            continuation_indent: "    ".to_string(),
            closing_indent: "".to_string(),
        };
        assert_eq!(
            render_collection(&elements, |s| s.to_string(), &layout),
            "[2,\n    ..xs,\n    1 // one\n]"
        );
    }

    #[test]
    fn test_render_keeps_comment_lines_before_element() {
        let elements = vec![
            ChainElement {
                element: CollectionElement::Spread("xs"),
                leading: Vec::new(),
                trailing: vec![Trivia::newline()],
            },
            ChainElement {
                element: CollectionElement::Value("1"),
                leading: vec![
                    Trivia::whitespace("    "),
                    Trivia::comment("// first"),
                    Trivia::newline(),
                    Trivia::whitespace("    "),
                ],
                trailing: Vec::new(),
            },
        ];
        assert_eq!(
            plain(&elements),
            "[..xs,\n    // first\n    1]"
        );
    }

    #[test]
    fn test_render_drops_whitespace_only_trivia() {
        let elements = vec![
            ChainElement {
                element: CollectionElement::Value("a"),
                leading: vec![Trivia::whitespace("  ")],
                trailing: vec![Trivia::whitespace(" ")],
            },
            ChainElement {
                element: CollectionElement::Value("b"),
                leading: vec![Trivia::whitespace(" ")],
                trailing: vec![Trivia::whitespace("  ")],
            },
        ];
        assert_eq!(plain(&elements), "[a, b]");
    }

    fn chain_in(source_body: &str) -> SyntaxChain {
        let source = format!("class C\n{{\n    void M()\n    {{\n        {source_body}\n    }}\n}}\n");
        let tree = SyntaxTree::parse(&source);
        let materialize = tree
            .root()
            .descendants()
            .filter_map(Invocation::cast)
            .find(|c| c.method_name().as_deref() == Some("ToList"))
            .unwrap();
        SyntaxChain::collect(materialize.receiver().unwrap()).unwrap()
    }

    #[test]
    fn test_collect_stops_at_first_other_call() {
        let chain = chain_in("var x = xs.Where(f).Append(1).Prepend(2).ToList();");
        let kinds: Vec<_> = chain.links.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![LinkKind::Prepend, LinkKind::Append]);
        assert_eq!(trimmed_text(chain.receiver.syntax()), "xs.Where(f)");
    }

    #[test]
    fn test_collect_rejects_wrong_arity() {
        let source = "class C { void M() { var x = xs.Append(1, 2).ToList(); } }";
        let tree = SyntaxTree::parse(source);
        let materialize = tree
            .root()
            .descendants()
            .filter_map(Invocation::cast)
            .find(|c| c.method_name().as_deref() == Some("ToList"))
            .unwrap();
        assert!(SyntaxChain::collect(materialize.receiver().unwrap()).is_none());
    }

    #[test]
    fn test_truncate_moves_receiver_outward() {
        let chain = chain_in("var x = xs.Append(1).Prepend(2).ToList();");
        let truncated = chain.truncate(1).unwrap();
        assert_eq!(truncated.len(), 1);
        assert_eq!(trimmed_text(truncated.receiver.syntax()), "xs.Append(1)");
        let chain = chain_in("var x = xs.Append(1).ToList();");
        assert!(chain.truncate(2).is_none());
    }

    #[test]
    fn test_elements_from_tree() {
        let chain = chain_in("var x = xs\n            .Append(1) // one\n            .Prepend(2)\n            .ToList();");
        let elements = chain.elements();
        let layout = Layout {
            continuation_indent: chain.continuation_indent(),
            closing_indent: "        ".to_string(),
        };
        let rendered = render_collection(&elements, |e| trimmed_text(e.syntax()), &layout);
        assert_eq!(
            rendered,
            "[2,\n            ..xs,\n            1 // one\n        ]"
        );
    }
}
