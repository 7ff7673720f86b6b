//! Trivia-preserving rewrites shared by fixers
//!
//! Each policy takes red nodes of the current tree and returns green
//! replacements. Text outside the rewritten node is never touched; inside
//! it, comments survive and line structure is kept where the policy says so.

use glint_core::cst::ast::{AstNode, BinaryExpr, CompilationUnit, ConditionalExpr, Invocation};
use glint_core::cst::trivia::{
    Trivia, contains_comment, contains_newline, green_leading_trivia, green_trailing_trivia,
    node_trailing_trivia, trailing_trivia, trim_end_whitespace, with_leading_trivia,
    with_trailing_trivia, without_trivia,
};
use glint_core::cst::{GreenElement, GreenNode, NodeOrToken, make, surgeon};
use glint_core::{CsSyntaxKind, SyntaxNode};

/// `content` without its own boundary trivia, wrapped in the boundary
/// trivia of `slot`
///
/// Used when one expression takes the place of another.
pub fn transplant(content: &SyntaxNode, slot: &SyntaxNode) -> GreenNode {
    in_slot(&without_trivia(&content.green()), slot)
}

/// A freshly built node wrapped in the boundary trivia of `slot`
pub fn in_slot(green: &GreenNode, slot: &SyntaxNode) -> GreenNode {
    let slot_green = slot.green();
    let leading = with_leading_trivia(green, &green_leading_trivia(&slot_green));
    with_trailing_trivia(&leading, &green_trailing_trivia(&slot_green))
}

/// `receiver.Call(args)` to `receiver`
///
/// Comments attached to the removed `.Call(args)` tokens move to the end of
/// the receiver, the receiver keeps a trailing comment of its own, and the
/// trivia after the closing parenthesis stays in place. Returns the
/// replacement for the invocation node.
pub fn remove_trailing_call(call: &Invocation) -> Option<GreenNode> {
    let receiver = call.receiver()?;
    let r_paren = call.arg_list()?.r_paren()?;
    let receiver_end = receiver.syntax().text_range().end();

    let removed: Vec<Trivia> = call
        .syntax()
        .descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| t.text_range().start() >= receiver_end)
        .take_while(|t| t != &r_paren)
        .filter_map(|t| Trivia::from_token(&t))
        .collect();
    let absorbed = if contains_comment(&removed) {
        trim_end_whitespace(&removed)
    } else {
        Vec::new()
    };

    let receiver_green = receiver.syntax().green();
    let own = green_trailing_trivia(&receiver_green);
    let mut trailing = if contains_comment(&own) || !absorbed.is_empty() {
        own
    } else {
        Vec::new()
    };
    trailing.extend(absorbed);
    let tail = trailing_trivia(&r_paren);
    // a kept line break already ends the receiver's line
    if !contains_newline(&trailing) || contains_comment(&tail) {
        trailing.extend(tail);
    }
    Some(with_trailing_trivia(&receiver_green, &trailing))
}

/// Move a binary operator from the end of a line to the start of the next
///
/// ```text
/// a && // why     a // why
///     b       ->      && b
/// ```
///
/// The left operand keeps a comment that followed the operator and ends the
/// line, the operator takes over the right operand's indentation and the
/// right operand is separated from it by one space. Returns `None` when the
/// operator does not end a line.
pub fn move_operator_to_line_start(binary: &BinaryExpr) -> Option<GreenNode> {
    if !is_trailing_operator(binary) {
        return None;
    }

    let lhs = binary.lhs()?;
    let rhs = binary.rhs()?;
    let op = binary.op_token()?;

    let lhs_green = lhs.syntax().green();
    let lhs_trailing = green_trailing_trivia(&lhs_green);
    let op_trailing = trailing_trivia(&op);
    let newline = op_trailing.iter().rposition(Trivia::is_newline)?;

    let mut new_lhs_trailing = trim_end_whitespace(&lhs_trailing);
    new_lhs_trailing.extend(trim_end_whitespace(&op_trailing[..newline]));
    new_lhs_trailing.extend(op_trailing[newline..].iter().cloned());

    let rhs_green = rhs.syntax().green();
    let op_leading = green_leading_trivia(&rhs_green);

    let mut children: Vec<GreenElement> = vec![NodeOrToken::Node(with_trailing_trivia(
        &lhs_green,
        &new_lhs_trailing,
    ))];
    children.extend(make::trivia(&op_leading));
    children.push(NodeOrToken::Token(op.green().to_owned()));
    children.push(NodeOrToken::Node(with_leading_trivia(
        &rhs_green,
        &[Trivia::whitespace(" ")],
    )));
    Some(make::node(CsSyntaxKind::BinaryExpr, children))
}

/// Whether the operator of `binary` ends the left operand's line
pub fn is_trailing_operator(binary: &BinaryExpr) -> bool {
    let (Some(lhs), Some(op)) = (binary.lhs(), binary.op_token()) else {
        return false;
    };
    !contains_newline(&node_trailing_trivia(lhs.syntax()))
        && contains_newline(&trailing_trivia(&op))
}

/// `c ? a : b` to `c' ? b : a` with `c'` given
///
/// Every slot keeps its own boundary trivia, so the `?` and `:` tokens and
/// the line structure around them do not move.
pub fn swap_conditional_branches(
    conditional: &ConditionalExpr,
    condition: &SyntaxNode,
) -> Option<GreenNode> {
    let old_condition = conditional.condition()?;
    let when_true = conditional.when_true()?;
    let when_false = conditional.when_false()?;

    let replacements = [
        transplant(condition, old_condition.syntax()),
        transplant(when_false.syntax(), when_true.syntax()),
        transplant(when_true.syntax(), when_false.syntax()),
    ];
    let mut slots = replacements.into_iter();
    let children: Vec<GreenElement> = conditional
        .syntax()
        .green()
        .children()
        .map(|child| match child {
            NodeOrToken::Node(node) => match slots.next() {
                Some(replacement) => NodeOrToken::Node(replacement),
                None => NodeOrToken::Node(node.to_owned()),
            },
            NodeOrToken::Token(token) => NodeOrToken::Token(token.to_owned()),
        })
        .collect();
    Some(make::node(CsSyntaxKind::ConditionalExpr, children))
}

/// Add `using` directives that are not there yet
///
/// New directives go after the last top-level `using`, or at the very top
/// of a file without any, in the order given. Returns the new root.
pub fn ensure_using_directives(root: &SyntaxNode, namespaces: &[&str]) -> Option<GreenNode> {
    let unit = CompilationUnit::cast(root.clone())?;
    let existing: Vec<String> = unit.usings().filter_map(|u| u.name()).collect();

    let mut missing: Vec<&str> = Vec::new();
    for namespace in namespaces {
        if !existing.iter().any(|e| e == namespace) && !missing.contains(namespace) {
            missing.push(namespace);
        }
    }
    if missing.is_empty() {
        return Some(root.green().into_owned());
    }

    let index = unit.usings().last().map_or(0, |u| u.syntax().index() + 1);
    let directives = missing
        .iter()
        .map(|ns| make::using_directive(ns).map(NodeOrToken::Node))
        .collect::<Option<Vec<GreenElement>>>()?;
    tracing::debug!(namespaces = ?missing, "Adding using directives");
    Some(surgeon::insert_children(root, index, directives))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::SyntaxTree;
    use glint_core::cst::ast::PrefixExpr;

    fn method(body: &str) -> String {
        format!("class C\n{{\n    void M()\n    {{\n        {body}\n    }}\n}}\n")
    }

    fn first<N: AstNode>(tree: &SyntaxTree) -> N {
        tree.root().descendants().find_map(N::cast).unwrap()
    }

    fn call_named(tree: &SyntaxTree, name: &str) -> Invocation {
        tree.root()
            .descendants()
            .filter_map(Invocation::cast)
            .find(|c| c.method_name().as_deref() == Some(name))
            .unwrap()
    }

    fn replaced(node: &SyntaxNode, green: GreenNode) -> String {
        SyntaxNode::new_root(surgeon::replace_node(node, green))
            .text()
            .to_string()
    }

    #[test]
    fn test_remove_trailing_call_simple() {
        let tree = SyntaxTree::parse(&method("var a = xs.ToArray();"));
        let call = call_named(&tree, "ToArray");
        let green = remove_trailing_call(&call).unwrap();
        assert_eq!(replaced(call.syntax(), green), method("var a = xs;"));
    }

    #[test]
    fn test_remove_trailing_call_across_lines() {
        let tree = SyntaxTree::parse(&method(
            "var a = xs\n            .ToList()\n            .Where(x => x > 1);",
        ));
        let call = call_named(&tree, "ToList");
        let green = remove_trailing_call(&call).unwrap();
        assert_eq!(
            replaced(call.syntax(), green),
            method("var a = xs\n            .Where(x => x > 1);")
        );
    }

    #[test]
    fn test_remove_trailing_call_absorbs_comments() {
        let tree = SyntaxTree::parse(&method("var a = xs./* gone */ToArray();"));
        let call = call_named(&tree, "ToArray");
        let green = remove_trailing_call(&call).unwrap();
        assert_eq!(replaced(call.syntax(), green), method("var a = xs/* gone */;"));
    }

    #[test]
    fn test_remove_trailing_call_keeps_receiver_comment() {
        let tree = SyntaxTree::parse(&method(
            "var a = xs // source\n            .ToList()\n            .Where(x => x > 1);",
        ));
        let call = call_named(&tree, "ToList");
        let green = remove_trailing_call(&call).unwrap();
        assert_eq!(
            replaced(call.syntax(), green),
            method("var a = xs // source\n            .Where(x => x > 1);")
        );
    }

    #[test]
    fn test_move_operator() {
        let tree = SyntaxTree::parse(&method(
            "var ok = first &&\n            second;",
        ));
        let binary: BinaryExpr = first(&tree);
        let green = move_operator_to_line_start(&binary).unwrap();
        assert_eq!(
            replaced(binary.syntax(), green),
            method("var ok = first\n            && second;")
        );
    }

    #[test]
    fn test_move_operator_keeps_comments() {
        let tree = SyntaxTree::parse(&method(
            "var ok = first && // first half\n            // second half\n            second; // done",
        ));
        let binary: BinaryExpr = first(&tree);
        let green = move_operator_to_line_start(&binary).unwrap();
        assert_eq!(
            replaced(binary.syntax(), green),
            method("var ok = first // first half\n            // second half\n            && second; // done")
        );
    }

    #[test]
    fn test_move_operator_requires_line_end() {
        let tree = SyntaxTree::parse(&method("var ok = first && second;"));
        let binary: BinaryExpr = first(&tree);
        assert!(move_operator_to_line_start(&binary).is_none());
    }

    #[test]
    fn test_swap_branches() {
        let tree = SyntaxTree::parse(&method("var v = !ok\n            ? one\n            : two;"));
        let conditional: ConditionalExpr = first(&tree);
        let prefix: PrefixExpr = first(&tree);
        let operand = prefix.operand().unwrap();
        let green = swap_conditional_branches(&conditional, operand.syntax()).unwrap();
        assert_eq!(
            replaced(conditional.syntax(), green),
            method("var v = ok\n            ? two\n            : one;")
        );
    }

    #[test]
    fn test_transplant_keeps_slot_trivia() {
        let tree = SyntaxTree::parse(&method("F(\n            /* a */ x /* b */, y);"));
        let args: Vec<_> = call_named(&tree, "F").args();
        let x = args[0].expr().unwrap();
        let y = args[1].expr().unwrap();
        let green = transplant(y.syntax(), x.syntax());
        assert_eq!(SyntaxNode::new_root(green).text().to_string(), "            /* a */ y /* b */");
    }

    #[test]
    fn test_ensure_using_directives() {
        let tree = SyntaxTree::parse("using System;\nusing System.Linq;\n\nclass C { }\n");
        let green =
            ensure_using_directives(&tree.root(), &["System.Collections.Generic", "System"]).unwrap();
        assert_eq!(
            SyntaxNode::new_root(green).text().to_string(),
            "using System;\nusing System.Linq;\nusing System.Collections.Generic;\n\nclass C { }\n"
        );
    }

    #[test]
    fn test_ensure_using_directives_without_usings() {
        let tree = SyntaxTree::parse("class C { }\n");
        let green = ensure_using_directives(&tree.root(), &["System.Linq"]).unwrap();
        assert_eq!(
            SyntaxNode::new_root(green.clone()).text().to_string(),
            "using System.Linq;\nclass C { }\n"
        );
        let again = SyntaxTree::from_green(green);
        let same = ensure_using_directives(&again.root(), &["System.Linq"]).unwrap();
        assert_eq!(&same, again.green());
    }
}
