//! The node arena.
//!
//! [`Ast`] owns every node. Nodes are addressed by generational [`NodeId`]s,
//! store their parent as an id and their children as id sequences. Dropping
//! the arena releases every node; [`Ast::free`] releases one subtree early.
//!
//! Construction mistakes (wrong child kind, stale ids, cycles) are contract
//! violations and panic.

use eql_core::{DataType, Span};

use super::node::*;
use super::ops::{BinaryOp, UnaryOp};

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Arena-backed syntax tree.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    slots: Vec<Slot>,
    vacant: Vec<u32>,
    live: usize,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// The tree's root, normally the module produced by the parser.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) {
        assert!(
            self.entry(id).parent.is_none(),
            "root {id:?} must not have a parent"
        );
        self.root = Some(id);
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// Whether `id` refers to a node that has not been freed.
    pub fn is_live(&self, id: NodeId) -> bool {
        self.slots
            .get(id.index as usize)
            .is_some_and(|slot| slot.generation == id.generation && slot.entry.is_some())
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.entry(id).node
    }

    /// Mutable access for renaming and similar edits. Child links stay
    /// crate-private, so tree shape can only change through `Ast` methods.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.entry_mut(id).node
    }

    pub fn try_get(&self, id: NodeId) -> Option<&Node> {
        self.is_live(id).then(|| self.get(id))
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.get(id).kind()
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).name()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entry(id).parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id).children()
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.entry(id).span
    }

    pub fn set_span(&mut self, id: NodeId, span: Span) {
        self.entry_mut(id).span = span;
    }

    /// Walk parent links upward, starting at the parent of `id`.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            ast: self,
            next: self.parent(id),
        }
    }

    /// Nearest ancestor of the given kind.
    pub fn enclosing(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.ancestors(id).find(|&a| self.kind(a) == kind)
    }

    /// `id` and everything below it, in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            let children = self.children(next);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Every live node in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entry.as_ref().map(|entry| {
                (
                    NodeId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    &entry.node,
                )
            })
        })
    }

    /// Canonical text rendering of the subtree at `id`.
    pub fn dump(&self, id: NodeId) -> String {
        super::dump::dump(self, id)
    }

    // =========================================================================
    // Annotations
    // =========================================================================

    pub fn annotation(&self, id: NodeId) -> Option<&Annotation> {
        self.entry(id).annotation.as_ref()
    }

    /// The resolved type of `id`, if annotated.
    pub fn node_type(&self, id: NodeId) -> Option<&DataType> {
        self.annotation(id).map(|a| &a.ty)
    }

    pub fn set_annotation(&mut self, id: NodeId, annotation: Annotation) {
        self.entry_mut(id).annotation = Some(annotation);
    }

    pub fn clear_annotations(&mut self) {
        for slot in &mut self.slots {
            if let Some(entry) = &mut slot.entry {
                entry.annotation = None;
            }
        }
    }

    // =========================================================================
    // Constructors: declarations
    // =========================================================================

    /// Create a module owning `classes` and an optional main function.
    ///
    /// Children are attached through [`add_class`](Self::add_class) and
    /// [`set_main_function`](Self::set_main_function), so the batch and
    /// incremental forms always agree.
    pub fn create_module(
        &mut self,
        name: impl Into<String>,
        classes: impl IntoIterator<Item = NodeId>,
        main_function: Option<NodeId>,
    ) -> NodeId {
        let id = self.alloc(Node::Module(Module {
            name: name.into(),
            classes: Vec::new(),
            main_function: None,
        }));
        for class in classes {
            self.add_class(id, class);
        }
        if let Some(function) = main_function {
            self.set_main_function(id, function);
        }
        id
    }

    pub fn create_class(
        &mut self,
        name: impl Into<String>,
        properties: impl IntoIterator<Item = NodeId>,
        methods: impl IntoIterator<Item = NodeId>,
    ) -> NodeId {
        let id = self.alloc(Node::Class(Class {
            name: name.into(),
            properties: Vec::new(),
            methods: Vec::new(),
        }));
        for property in properties {
            self.add_property(id, property);
        }
        for method in methods {
            self.add_method(id, method);
        }
        id
    }

    pub fn create_function(
        &mut self,
        name: impl Into<String>,
        return_type: impl Into<String>,
        params: impl IntoIterator<Item = NodeId>,
        body: Option<NodeId>,
    ) -> NodeId {
        let id = self.alloc(Node::Function(Function {
            name: name.into(),
            return_type: return_type.into(),
            params: Vec::new(),
            body: None,
        }));
        for param in params {
            self.add_param(id, param);
        }
        if let Some(body) = body {
            self.set_body(id, body);
        }
        id
    }

    pub fn create_property(
        &mut self,
        access: Access,
        type_name: impl Into<String>,
        name: impl Into<String>,
    ) -> NodeId {
        self.alloc(Node::Property(Property {
            access,
            type_name: type_name.into(),
            name: name.into(),
        }))
    }

    pub fn create_var_decl(
        &mut self,
        type_name: impl Into<String>,
        name: impl Into<String>,
        initializer: Option<NodeId>,
    ) -> NodeId {
        let id = self.alloc(Node::VarDecl(VarDecl {
            type_name: type_name.into(),
            name: name.into(),
            initializer: None,
        }));
        if let Some(init) = initializer {
            self.set_initializer(id, init);
        }
        id
    }

    // =========================================================================
    // Constructors: statements
    // =========================================================================

    pub fn create_block(&mut self, statements: impl IntoIterator<Item = NodeId>) -> NodeId {
        let id = self.alloc(Node::Block(Block::default()));
        for statement in statements {
            self.add_statement(id, statement);
        }
        id
    }

    pub fn create_assignment(&mut self, target: NodeId, value: NodeId) -> NodeId {
        let target_kind = self.kind(target);
        assert!(
            matches!(target_kind, NodeKind::VarRef | NodeKind::PropertyRef),
            "assignment target must be a VarRef or PropertyRef, found {target_kind:?}"
        );
        self.expect_expression(value, "assignment value");
        let id = self.alloc(Node::Assignment(Assignment { target, value }));
        self.adopt(id, target);
        self.adopt(id, value);
        id
    }

    pub fn create_if(&mut self, condition: NodeId, then_block: NodeId, else_branch: Option<NodeId>) -> NodeId {
        self.expect_expression(condition, "if condition");
        self.expect_kind(then_block, NodeKind::Block, "then branch");
        let id = self.alloc(Node::If(If {
            condition,
            then_block,
            else_branch: None,
        }));
        self.adopt(id, condition);
        self.adopt(id, then_block);
        if let Some(branch) = else_branch {
            self.set_else_branch(id, branch);
        }
        id
    }

    pub fn create_while(&mut self, condition: NodeId, body: NodeId) -> NodeId {
        self.expect_expression(condition, "while condition");
        self.expect_kind(body, NodeKind::Block, "while body");
        let id = self.alloc(Node::While(While { condition, body }));
        self.adopt(id, condition);
        self.adopt(id, body);
        id
    }

    pub fn create_return(&mut self, value: Option<NodeId>) -> NodeId {
        let id = self.alloc(Node::Return(Return::default()));
        if let Some(value) = value {
            self.expect_expression(value, "return value");
            self.adopt(id, value);
            if let Node::Return(ret) = &mut self.entry_mut(id).node {
                ret.value = Some(value);
            }
        }
        id
    }

    pub fn create_expr_stmt(&mut self, expr: NodeId) -> NodeId {
        self.expect_expression(expr, "expression statement");
        let id = self.alloc(Node::ExprStmt(ExprStmt { expr }));
        self.adopt(id, expr);
        id
    }

    // =========================================================================
    // Constructors: expressions
    // =========================================================================

    pub fn create_literal(&mut self, literal: Literal) -> NodeId {
        self.alloc(Node::Literal(literal))
    }

    pub fn create_var_ref(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(Node::VarRef(VarRef { name: name.into() }))
    }

    pub fn create_property_ref(&mut self, target: NodeId, name: impl Into<String>) -> NodeId {
        self.expect_expression(target, "property target");
        let id = self.alloc(Node::PropertyRef(PropertyRef {
            target,
            name: name.into(),
        }));
        self.adopt(id, target);
        id
    }

    pub fn create_method_call(
        &mut self,
        target: Option<NodeId>,
        name: impl Into<String>,
        args: impl IntoIterator<Item = NodeId>,
    ) -> NodeId {
        let id = self.alloc(Node::MethodCall(MethodCall {
            target: None,
            name: name.into(),
            args: Vec::new(),
        }));
        if let Some(target) = target {
            self.expect_expression(target, "call target");
            self.adopt(id, target);
            if let Node::MethodCall(call) = &mut self.entry_mut(id).node {
                call.target = Some(target);
            }
        }
        for arg in args {
            self.add_arg(id, arg);
        }
        id
    }

    pub fn create_binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.expect_expression(lhs, "left operand");
        self.expect_expression(rhs, "right operand");
        let id = self.alloc(Node::Binary(Binary { op, lhs, rhs }));
        self.adopt(id, lhs);
        self.adopt(id, rhs);
        id
    }

    pub fn create_unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        self.expect_expression(operand, "operand");
        let id = self.alloc(Node::Unary(Unary { op, operand }));
        self.adopt(id, operand);
        id
    }

    pub fn create_new(&mut self, type_name: impl Into<String>) -> NodeId {
        self.alloc(Node::New(New {
            type_name: type_name.into(),
        }))
    }

    // =========================================================================
    // Add-child operations
    // =========================================================================

    /// Append `class` to the module's classes.
    pub fn add_class(&mut self, module: NodeId, class: NodeId) {
        self.expect_kind(module, NodeKind::Module, "add_class target");
        self.expect_kind(class, NodeKind::Class, "module member");
        self.adopt(module, class);
        if let Node::Module(m) = &mut self.entry_mut(module).node {
            m.classes.push(class);
        }
    }

    /// Install the module's main function, returning the detached previous one.
    pub fn set_main_function(&mut self, module: NodeId, function: NodeId) -> Option<NodeId> {
        self.expect_kind(module, NodeKind::Module, "set_main_function target");
        self.expect_kind(function, NodeKind::Function, "main function");
        self.adopt(module, function);
        let previous = match &mut self.entry_mut(module).node {
            Node::Module(m) => m.main_function.replace(function),
            _ => None,
        };
        self.orphan(previous)
    }

    pub fn add_property(&mut self, class: NodeId, property: NodeId) {
        self.expect_kind(class, NodeKind::Class, "add_property target");
        self.expect_kind(property, NodeKind::Property, "class property");
        self.adopt(class, property);
        if let Node::Class(c) = &mut self.entry_mut(class).node {
            c.properties.push(property);
        }
    }

    pub fn add_method(&mut self, class: NodeId, method: NodeId) {
        self.expect_kind(class, NodeKind::Class, "add_method target");
        self.expect_kind(method, NodeKind::Function, "class method");
        self.adopt(class, method);
        if let Node::Class(c) = &mut self.entry_mut(class).node {
            c.methods.push(method);
        }
    }

    pub fn add_param(&mut self, function: NodeId, param: NodeId) {
        self.expect_kind(function, NodeKind::Function, "add_param target");
        self.expect_kind(param, NodeKind::VarDecl, "parameter");
        self.adopt(function, param);
        if let Node::Function(f) = &mut self.entry_mut(function).node {
            f.params.push(param);
        }
    }

    /// Install a function body, returning the detached previous one.
    pub fn set_body(&mut self, function: NodeId, body: NodeId) -> Option<NodeId> {
        self.expect_kind(function, NodeKind::Function, "set_body target");
        self.expect_kind(body, NodeKind::Block, "function body");
        self.adopt(function, body);
        let previous = match &mut self.entry_mut(function).node {
            Node::Function(f) => f.body.replace(body),
            _ => None,
        };
        self.orphan(previous)
    }

    pub fn add_statement(&mut self, block: NodeId, statement: NodeId) {
        self.expect_kind(block, NodeKind::Block, "add_statement target");
        let kind = self.kind(statement);
        assert!(kind.is_statement(), "block member must be a statement, found {kind:?}");
        self.adopt(block, statement);
        if let Node::Block(b) = &mut self.entry_mut(block).node {
            b.statements.push(statement);
        }
    }

    pub fn add_arg(&mut self, call: NodeId, arg: NodeId) {
        self.expect_kind(call, NodeKind::MethodCall, "add_arg target");
        self.expect_expression(arg, "call argument");
        self.adopt(call, arg);
        if let Node::MethodCall(c) = &mut self.entry_mut(call).node {
            c.args.push(arg);
        }
    }

    pub fn set_initializer(&mut self, var_decl: NodeId, value: NodeId) -> Option<NodeId> {
        self.expect_kind(var_decl, NodeKind::VarDecl, "set_initializer target");
        self.expect_expression(value, "initializer");
        self.adopt(var_decl, value);
        let previous = match &mut self.entry_mut(var_decl).node {
            Node::VarDecl(v) => v.initializer.replace(value),
            _ => None,
        };
        self.orphan(previous)
    }

    pub fn set_else_branch(&mut self, if_stmt: NodeId, branch: NodeId) -> Option<NodeId> {
        self.expect_kind(if_stmt, NodeKind::If, "set_else_branch target");
        let kind = self.kind(branch);
        assert!(
            matches!(kind, NodeKind::Block | NodeKind::If),
            "else branch must be a Block or If, found {kind:?}"
        );
        self.adopt(if_stmt, branch);
        let previous = match &mut self.entry_mut(if_stmt).node {
            Node::If(i) => i.else_branch.replace(branch),
            _ => None,
        };
        self.orphan(previous)
    }

    // =========================================================================
    // Destruction
    // =========================================================================

    /// Release `id` and its whole subtree, unlinking it from its parent.
    ///
    /// # Panics
    /// If `id` was already freed, or fills a required slot of its parent.
    pub fn free(&mut self, id: NodeId) {
        if let Some(parent) = self.entry(id).parent {
            let unlinked = self.entry_mut(parent).node.unlink(id);
            assert!(
                unlinked,
                "cannot free {id:?}: it is a required child of {parent:?}"
            );
        }
        if self.root == Some(id) {
            self.root = None;
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let entry = self.release(next);
            stack.extend(entry.node.children());
        }
    }

    /// [`free`](Self::free) that accepts an absent node.
    pub fn free_opt(&mut self, id: Option<NodeId>) {
        if let Some(id) = id {
            self.free(id);
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn alloc(&mut self, node: Node) -> NodeId {
        let entry = Entry {
            node,
            parent: None,
            span: Span::default(),
            annotation: None,
        };
        self.live += 1;
        if let Some(index) = self.vacant.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                entry: Some(entry),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Entry {
        let slot = &mut self.slots[id.index as usize];
        assert!(slot.generation == id.generation, "node {id:?} released twice");
        let Some(entry) = slot.entry.take() else {
            panic!("node {id:?} released twice");
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.vacant.push(id.index);
        self.live -= 1;
        entry
    }

    fn entry(&self, id: NodeId) -> &Entry {
        match self.slots.get(id.index as usize) {
            Some(Slot {
                generation,
                entry: Some(entry),
            }) if *generation == id.generation => entry,
            _ => panic!("stale or freed node id {id:?}"),
        }
    }

    fn entry_mut(&mut self, id: NodeId) -> &mut Entry {
        match self.slots.get_mut(id.index as usize) {
            Some(Slot {
                generation,
                entry: Some(entry),
            }) if *generation == id.generation => entry,
            _ => panic!("stale or freed node id {id:?}"),
        }
    }

    /// Make `child` a child of `parent`, detaching it from any previous owner.
    fn adopt(&mut self, parent: NodeId, child: NodeId) {
        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            assert!(
                node != child,
                "attaching {child:?} beneath {parent:?} would create a cycle"
            );
            cursor = self.entry(node).parent;
        }
        if let Some(old) = self.entry(child).parent {
            let unlinked = self.entry_mut(old).node.unlink(child);
            assert!(
                unlinked,
                "{child:?} is a required child of {old:?} and cannot be re-parented"
            );
        }
        if self.root == Some(child) {
            self.root = None;
        }
        self.entry_mut(child).parent = Some(parent);
    }

    fn orphan(&mut self, previous: Option<NodeId>) -> Option<NodeId> {
        if let Some(old) = previous {
            self.entry_mut(old).parent = None;
        }
        previous
    }

    fn expect_kind(&self, id: NodeId, kind: NodeKind, role: &str) {
        let actual = self.kind(id);
        assert!(actual == kind, "{role} must be a {kind:?} node, found {actual:?}");
    }

    fn expect_expression(&self, id: NodeId, role: &str) {
        let actual = self.kind(id);
        assert!(actual.is_expression(), "{role} must be an expression, found {actual:?}");
    }
}

/// Iterator over a node's ancestors, innermost first.
pub struct Ancestors<'a> {
    ast: &'a Ast,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.ast.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn empty_class(ast: &mut Ast, name: &str) -> NodeId {
        ast.create_class(name, [], [])
    }

    #[test]
    fn module_create_sets_parents_and_dumps() {
        let mut ast = Ast::new();
        let foo = empty_class(&mut ast, "Foo");
        let bar = empty_class(&mut ast, "Bar");
        let main = ast.create_function("", "", [], None);
        let module = ast.create_module("bar", [foo, bar], Some(main));

        let m = ast.get(module).as_module().unwrap();
        assert_eq!(m.classes(), &[foo, bar]);
        assert_eq!(m.main_function(), Some(main));
        for child in [foo, bar, main] {
            assert_eq!(ast.parent(child), Some(module));
        }
        assert_eq!(ast.parent(module), None);

        assert_eq!(
            ast.dump(module),
            "<module name='bar'>\n  <class name='Foo'>\n  <class name='Bar'>\n  <function name='' return-type=''>\n"
        );
    }

    #[test]
    fn incremental_add_class_matches_batch_construction() {
        let mut incremental = Ast::new();
        let module = incremental.create_module("bar", [], None);
        let foo = empty_class(&mut incremental, "Foo");
        let bar = empty_class(&mut incremental, "Bar");
        incremental.add_class(module, foo);
        assert_eq!(incremental.get(module).as_module().unwrap().classes().last(), Some(&foo));
        incremental.add_class(module, bar);

        assert_eq!(incremental.get(module).as_module().unwrap().classes(), &[foo, bar]);
        assert_eq!(incremental.parent(foo), Some(module));
        assert_eq!(incremental.parent(bar), Some(module));

        let mut batch = Ast::new();
        let classes = [empty_class(&mut batch, "Foo"), empty_class(&mut batch, "Bar")];
        let batch_module = batch.create_module("bar", classes, None);
        assert_eq!(incremental.dump(module), batch.dump(batch_module));
    }

    #[test]
    fn reparenting_moves_the_child() {
        let mut ast = Ast::new();
        let a = ast.create_module("a", [], None);
        let b = ast.create_module("b", [], None);
        let class = empty_class(&mut ast, "Foo");
        ast.add_class(a, class);
        ast.add_class(b, class);

        assert_eq!(ast.parent(class), Some(b));
        assert!(ast.get(a).as_module().unwrap().classes().is_empty());
        assert_eq!(ast.get(b).as_module().unwrap().classes(), &[class]);
    }

    #[test]
    fn replacing_main_function_detaches_previous() {
        let mut ast = Ast::new();
        let first = ast.create_function("", "", [], None);
        let module = ast.create_module("m", [], Some(first));
        let second = ast.create_function("", "", [], None);
        assert_eq!(ast.set_main_function(module, second), Some(first));
        assert_eq!(ast.parent(first), None);
        assert_eq!(ast.parent(second), Some(module));
    }

    #[test]
    fn free_releases_whole_subtree() {
        let mut ast = Ast::new();
        let x = ast.create_property(Access::Public, "Int", "x");
        let class = ast.create_class("Foo", [x], []);
        let other = empty_class(&mut ast, "Bar");
        let module = ast.create_module("m", [class, other], None);
        assert_eq!(ast.len(), 4);

        ast.free(class);
        assert_eq!(ast.len(), 2);
        assert!(!ast.is_live(class));
        assert!(!ast.is_live(x));
        assert_eq!(ast.get(module).as_module().unwrap().classes(), &[other]);

        ast.free(module);
        assert!(ast.is_empty());
    }

    #[test]
    fn freed_slots_are_recycled_with_new_generation() {
        let mut ast = Ast::new();
        let old = ast.create_var_ref("a");
        ast.free(old);
        let new = ast.create_var_ref("b");
        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert!(ast.try_get(old).is_none());
        assert_eq!(ast.name(new), Some("b"));
    }

    #[test]
    fn free_opt_none_is_a_no_op() {
        let mut ast = Ast::new();
        ast.create_block([]);
        ast.free_opt(None);
        assert_eq!(ast.len(), 1);
    }

    #[test]
    #[should_panic(expected = "stale or freed node id")]
    fn double_free_panics() {
        let mut ast = Ast::new();
        let block = ast.create_block([]);
        ast.free(block);
        ast.free(block);
    }

    #[test]
    #[should_panic(expected = "required child")]
    fn freeing_a_required_child_panics() {
        let mut ast = Ast::new();
        let lhs = ast.create_literal(Literal::Int(1));
        let rhs = ast.create_literal(Literal::Int(2));
        ast.create_binary(BinaryOp::Add, lhs, rhs);
        ast.free(lhs);
    }

    #[test]
    #[should_panic(expected = "must be a Class node")]
    fn wrong_child_kind_panics() {
        let mut ast = Ast::new();
        let module = ast.create_module("m", [], None);
        let function = ast.create_function("f", "Int", [], None);
        ast.add_class(module, function);
    }

    #[test]
    #[should_panic(expected = "would create a cycle")]
    fn attaching_an_ancestor_panics() {
        let mut ast = Ast::new();
        let inner = ast.create_block([]);
        let outer = ast.create_block([inner]);
        ast.add_statement(inner, outer);
    }

    #[test]
    fn ancestors_walk_to_the_root() {
        let mut ast = Ast::new();
        let value = ast.create_var_ref("x");
        let ret = ast.create_return(Some(value));
        let body = ast.create_block([ret]);
        let function = ast.create_function("", "", [], Some(body));
        let module = ast.create_module("m", [], Some(function));

        let chain: Vec<_> = ast.ancestors(value).collect();
        assert_eq!(chain, vec![ret, body, function, module]);
        assert_eq!(ast.enclosing(value, NodeKind::Function), Some(function));
        assert_eq!(ast.descendants(function), vec![function, body, ret, value]);
    }

    #[test]
    fn annotations_can_be_cleared() {
        let mut ast = Ast::new();
        let lit = ast.create_literal(Literal::Int(3));
        ast.set_annotation(lit, Annotation::typed(DataType::Int));
        assert_eq!(ast.node_type(lit), Some(&DataType::Int));
        ast.clear_annotations();
        assert_eq!(ast.annotation(lit), None);
    }
}
