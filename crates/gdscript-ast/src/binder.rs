//! Identifier binding.
//!
//! Runs once after a tree is built. Each identifier expression gets an
//! [`IdentifierSource`]: a parameter, a local declared earlier in an
//! enclosing block, or a member of the class the code lives in. Anything
//! else stays [`IdentifierSource::Undefined`] and goes through the
//! analyzer's global lookup.

use rustc_hash::FxHashMap;

use gdscript_core::ClassId;

use crate::class::Member;
use crate::expr::{ExprKind, IdentifierSource, SubscriptIndex};
use crate::pattern::PatternKind;
use crate::stmt::StmtKind;
use crate::tree::ParseTree;
use crate::{ExprId, FunctionId, PatternId, StmtId, SuiteId};

/// Classify every identifier in `tree`.
pub fn bind(tree: &mut ParseTree) {
    let sources = {
        let mut binder = Binder::new(tree);
        binder.bind_all();
        binder.sources
    };
    for (expr, resolved) in sources {
        if let ExprKind::Identifier { source, .. } = &mut tree[expr].kind {
            *source = resolved;
        }
    }
}

struct Binder<'t> {
    tree: &'t ParseTree,
    class: ClassId,
    scopes: Vec<FxHashMap<String, IdentifierSource>>,
    sources: Vec<(ExprId, IdentifierSource)>,
}

impl<'t> Binder<'t> {
    fn new(tree: &'t ParseTree) -> Self {
        Self {
            tree,
            class: ClassId::HEAD,
            scopes: Vec::new(),
            sources: Vec::new(),
        }
    }

    fn bind_all(&mut self) {
        let tree = self.tree;
        for class in tree.class_ids() {
            self.class = class;
            for member in &tree[class].members {
                match member {
                    Member::Variable(v) => self.bind_opt(v.initializer),
                    Member::Constant(c) => self.bind_opt(c.initializer),
                    Member::EnumValue(v) => self.bind_opt(v.expr),
                    Member::Enum(e) => e.values.iter().for_each(|v| self.bind_opt(v.expr)),
                    Member::Signal(s) => s.params.iter().for_each(|p| self.bind_opt(p.default)),
                    Member::Function(_) | Member::Class(_) => {}
                }
            }
        }
        for function in self.tree.function_ids() {
            self.bind_function(function);
        }
    }

    fn bind_function(&mut self, id: FunctionId) {
        let tree = self.tree;
        let function = &tree[id];
        self.class = function.class;
        self.scopes.clear();
        self.scopes.push(FxHashMap::default());
        for (index, param) in function.params.iter().enumerate() {
            // defaults see the parameters declared before them
            self.bind_opt(param.default);
            self.declare(&param.name, IdentifierSource::Parameter(id, index));
        }
        self.bind_suite(function.body);
        self.scopes.clear();
    }

    fn declare(&mut self, name: &str, source: IdentifierSource) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), source);
        }
    }

    fn lookup(&self, name: &str) -> IdentifierSource {
        if let Some(source) = self.scopes.iter().rev().find_map(|s| s.get(name)) {
            return *source;
        }
        match self.tree[self.class].member(name) {
            Some((index, Member::Variable(_))) => IdentifierSource::MemberVariable(self.class, index),
            Some((index, Member::Constant(_) | Member::EnumValue(_))) => {
                IdentifierSource::MemberConstant(self.class, index)
            }
            Some((index, Member::Signal(_))) => IdentifierSource::MemberSignal(self.class, index),
            _ => IdentifierSource::Undefined,
        }
    }

    fn bind_suite(&mut self, suite: SuiteId) {
        self.scopes.push(FxHashMap::default());
        let tree = self.tree;
        for &stmt in &tree[suite].stmts {
            self.bind_stmt(stmt);
        }
        self.scopes.pop();
    }

    fn bind_stmt(&mut self, id: StmtId) {
        let tree = self.tree;
        match &tree[id].kind {
            StmtKind::Expression(e) => self.bind_expr(*e),
            StmtKind::Variable {
                name, initializer, ..
            } => {
                self.bind_opt(*initializer);
                self.declare(name, IdentifierSource::LocalVariable(id));
            }
            StmtKind::Constant {
                name, initializer, ..
            } => {
                self.bind_expr(*initializer);
                self.declare(name, IdentifierSource::LocalConstant(id));
            }
            StmtKind::If {
                condition,
                true_suite,
                false_suite,
            } => {
                self.bind_expr(*condition);
                self.bind_suite(*true_suite);
                if let Some(suite) = false_suite {
                    self.bind_suite(*suite);
                }
            }
            StmtKind::While { condition, body } => {
                self.bind_expr(*condition);
                self.bind_suite(*body);
            }
            StmtKind::For {
                variable,
                iterable,
                body,
                ..
            } => {
                self.bind_expr(*iterable);
                self.scopes.push(FxHashMap::default());
                self.declare(variable, IdentifierSource::LocalIterator(id));
                self.bind_suite(*body);
                self.scopes.pop();
            }
            StmtKind::Match { subject, branches } => {
                self.bind_expr(*subject);
                for branch in branches {
                    self.scopes.push(FxHashMap::default());
                    for &pattern in &branch.patterns {
                        self.bind_pattern(pattern);
                    }
                    self.bind_opt(branch.guard);
                    self.bind_suite(branch.body);
                    self.scopes.pop();
                }
            }
            StmtKind::Return(value) => self.bind_opt(*value),
            StmtKind::Assert { condition, message } => {
                self.bind_expr(*condition);
                self.bind_opt(*message);
            }
            StmtKind::Break | StmtKind::Continue | StmtKind::Pass | StmtKind::Breakpoint => {}
        }
    }

    fn bind_pattern(&mut self, id: PatternId) {
        let tree = self.tree;
        match &tree[id].kind {
            PatternKind::Literal(e) | PatternKind::Expression(e) => self.bind_expr(*e),
            PatternKind::Bind(name) => self.declare(name, IdentifierSource::LocalBind(id)),
            PatternKind::Wildcard => {}
            PatternKind::Array { elements, .. } => {
                for &element in elements {
                    self.bind_pattern(element);
                }
            }
            PatternKind::Dictionary { entries, .. } => {
                for (key, value) in entries {
                    self.bind_expr(*key);
                    if let Some(value) = value {
                        self.bind_pattern(*value);
                    }
                }
            }
        }
    }

    fn bind_opt(&mut self, expr: Option<ExprId>) {
        if let Some(expr) = expr {
            self.bind_expr(expr);
        }
    }

    fn bind_expr(&mut self, id: ExprId) {
        let tree = self.tree;
        match &tree[id].kind {
            ExprKind::Identifier { name, .. } => {
                let source = self.lookup(name);
                self.sources.push((id, source));
            }
            ExprKind::Literal(_)
            | ExprKind::SelfRef
            | ExprKind::Preload { .. }
            | ExprKind::GetNode { .. } => {}
            ExprKind::Array(items) => items.iter().for_each(|e| self.bind_expr(*e)),
            ExprKind::Dictionary(entries) => {
                for (key, value) in entries {
                    self.bind_expr(*key);
                    self.bind_expr(*value);
                }
            }
            ExprKind::Binary { left, right, .. } => {
                self.bind_expr(*left);
                self.bind_expr(*right);
            }
            ExprKind::Unary { operand, .. }
            | ExprKind::Await(operand)
            | ExprKind::Cast { operand, .. }
            | ExprKind::TypeTest { operand, .. } => self.bind_expr(*operand),
            ExprKind::Ternary {
                condition,
                true_expr,
                false_expr,
            } => {
                self.bind_expr(*condition);
                self.bind_expr(*true_expr);
                self.bind_expr(*false_expr);
            }
            ExprKind::Assignment {
                assignee, value, ..
            } => {
                self.bind_expr(*assignee);
                self.bind_expr(*value);
            }
            ExprKind::Call { base, args, .. } => {
                self.bind_opt(*base);
                args.iter().for_each(|e| self.bind_expr(*e));
            }
            ExprKind::Subscript { base, index } => {
                self.bind_expr(*base);
                if let SubscriptIndex::Index(index) = index {
                    self.bind_expr(*index);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{ExprKind, IdentifierSource, ParseTree, TreeBuilder};
    use gdscript_core::ClassId;

    use crate::ExprId;

    fn source_of(tree: &ParseTree, expr: ExprId) -> IdentifierSource {
        match &tree[expr].kind {
            ExprKind::Identifier { source, .. } => *source,
            other => panic!("not an identifier: {other:?}"),
        }
    }

    #[test]
    fn locals_shadow_members_after_declaration() {
        let mut b = TreeBuilder::new("res://a.gd");
        b.variable(ClassId::HEAD, "x", None, None);
        let before = b.ident("x");
        let s1 = b.expr_stmt(before);
        let one = b.int(1);
        let decl = b.var_stmt("x", None, Some(one));
        let after = b.ident("x");
        let s2 = b.expr_stmt(after);
        b.function(ClassId::HEAD, "f", vec![], None, vec![s1, decl, s2]);
        let tree = b.finish();

        assert_eq!(source_of(&tree, before), IdentifierSource::MemberVariable(ClassId::HEAD, 0));
        assert_eq!(source_of(&tree, after), IdentifierSource::LocalVariable(decl));
    }

    #[test]
    fn block_locals_do_not_escape() {
        let mut b = TreeBuilder::new("res://a.gd");
        let cond = b.bool(true);
        let zero = b.int(0);
        let inner = b.var_stmt("y", None, Some(zero));
        let if_stmt = b.if_stmt(cond, vec![inner], None);
        let y = b.ident("y");
        let use_y = b.expr_stmt(y);
        b.function(ClassId::HEAD, "f", vec![], None, vec![if_stmt, use_y]);
        let tree = b.finish();
        assert_eq!(source_of(&tree, y), IdentifierSource::Undefined);
    }

    #[test]
    fn parameters_iterators_and_binds() {
        let mut b = TreeBuilder::new("res://a.gd");
        let p = b.param("items", None, None);
        let items = b.ident("items");
        let it = b.ident("it");
        let print = b.call("print", vec![it]);
        let body = b.expr_stmt(print);
        let for_stmt = b.for_stmt("it", items, vec![body]);

        let subject = b.int(3);
        let bind = b.bind_pattern("v");
        let v = b.ident("v");
        let ret = b.return_stmt(Some(v));
        let branch = b.branch(vec![bind], None, vec![ret]);
        let match_stmt = b.match_stmt(subject, vec![branch]);
        let f = b.function(ClassId::HEAD, "f", vec![p], None, vec![for_stmt, match_stmt]);
        let tree = b.finish();

        assert_eq!(source_of(&tree, items), IdentifierSource::Parameter(f, 0));
        assert_eq!(source_of(&tree, it), IdentifierSource::LocalIterator(for_stmt));
        assert_eq!(source_of(&tree, v), IdentifierSource::LocalBind(bind));
    }

    #[test]
    fn member_initializers_see_class_constants() {
        let mut b = TreeBuilder::new("res://a.gd");
        b.unnamed_enum(ClassId::HEAD, &[("A", None)]);
        let a = b.ident("A");
        b.constant(ClassId::HEAD, "C", None, a);
        let sig = b.ident("changed");
        b.signal(ClassId::HEAD, "changed", vec![]);
        b.variable(ClassId::HEAD, "s", None, Some(sig));
        let tree = b.finish();

        assert_eq!(source_of(&tree, a), IdentifierSource::MemberConstant(ClassId::HEAD, 0));
        assert_eq!(source_of(&tree, sig), IdentifierSource::MemberSignal(ClassId::HEAD, 2));
    }

    #[test]
    fn nested_class_members_bind_to_their_own_class() {
        let mut b = TreeBuilder::new("res://a.gd");
        b.variable(ClassId::HEAD, "outer_var", None, None);
        let inner = b.class(ClassId::HEAD, "Inner");
        b.variable(inner, "inner_var", None, None);
        let outer_ref = b.ident("outer_var");
        let inner_ref = b.ident("inner_var");
        let s1 = b.expr_stmt(outer_ref);
        let s2 = b.expr_stmt(inner_ref);
        b.function(inner, "f", vec![], None, vec![s1, s2]);
        let tree = b.finish();

        assert_eq!(source_of(&tree, outer_ref), IdentifierSource::Undefined);
        assert_eq!(source_of(&tree, inner_ref), IdentifierSource::MemberVariable(inner, 0));
    }
}
