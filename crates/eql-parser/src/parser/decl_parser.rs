//! Class declarations and their members.

use eql_core::{SyntaxError, SyntaxErrorKind};

use super::Parser;
use crate::ast::{Access, NodeId};
use crate::lexer::{Token, TokenKind};

impl<'ast> Parser<'ast> {
    /// `class Name { member* }`
    pub(crate) fn parse_class(&mut self) -> Result<NodeId, SyntaxError> {
        let start = self.expect(TokenKind::Class)?.span;
        let name = self.expect_identifier()?;
        self.expect(TokenKind::LeftBrace)?;

        let class = self.ast.create_class(name.lexeme, [], []);
        while !self.check(TokenKind::RightBrace) {
            if self.is_eof() {
                return Err(self.unexpected(TokenKind::RightBrace.description()));
            }
            self.parse_member(class)?;
        }
        self.expect(TokenKind::RightBrace)?;
        Ok(self.finish(class, start))
    }

    /// `access? Type name ;` or `Type name ( params ) block`
    fn parse_member(&mut self, class: NodeId) -> Result<(), SyntaxError> {
        let start = self.peek().span;
        let access = if self.eat(TokenKind::Private).is_some() {
            Some(Access::Private)
        } else if self.eat(TokenKind::Public).is_some() {
            Some(Access::Public)
        } else {
            None
        };

        let type_name = self.parse_type_name()?;
        let name = self.expect_identifier()?;

        if self.check(TokenKind::LeftParen) {
            if access.is_some() {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::ExpectedClassMember,
                    start,
                    format!("access modifiers apply to properties only, found method '{}'", name.lexeme),
                ));
            }
            let method = self.parse_method(type_name, name)?;
            self.finish(method, start);
            self.ast.add_method(class, method);
            return Ok(());
        }

        if !self.check(TokenKind::Semicolon) {
            return Err(self.unexpected("';' or '('"));
        }
        self.advance();
        let property = self
            .ast
            .create_property(access.unwrap_or_default(), type_name.lexeme, name.lexeme);
        self.finish(property, start);
        self.ast.add_property(class, property);
        Ok(())
    }

    /// Parameters and body of a method whose type and name are already consumed.
    fn parse_method(&mut self, return_type: Token<'ast>, name: Token<'ast>) -> Result<NodeId, SyntaxError> {
        self.expect(TokenKind::LeftParen)?;
        let function = self.ast.create_function(name.lexeme, return_type.lexeme, [], None);

        if !self.check(TokenKind::RightParen) {
            loop {
                let param_start = self.peek().span;
                let param_type = self.parse_type_name()?;
                let param_name = self.expect_identifier()?;
                let param = self.ast.create_var_decl(param_type.lexeme, param_name.lexeme, None);
                self.finish(param, param_start);
                self.ast.add_param(function, param);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;

        let body = self.parse_block()?;
        self.ast.set_body(function, body);
        Ok(function)
    }

    /// A type is a single identifier; primitives and classes are told apart by the resolver.
    pub(crate) fn parse_type_name(&mut self) -> Result<Token<'ast>, SyntaxError> {
        if self.check(TokenKind::Identifier) {
            return Ok(self.advance());
        }
        let token = *self.peek();
        if token.kind == TokenKind::Eof {
            return Err(SyntaxError::unexpected_eof(token.span, "type"));
        }
        Err(SyntaxError::expected_type(token.span, &token.describe()))
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use eql_core::{Span, SyntaxErrorKind};
    use pretty_assertions::assert_eq;

    use crate::ast::{Ast, NodeKind};
    use crate::parser::Parser;

    fn parse(source: &str) -> Result<Ast, eql_core::SyntaxError> {
        let arena = Bump::new();
        Parser::new(source, &arena)?.parse_module("m")
    }

    #[test]
    fn class_members() {
        let ast = parse(
            "class Foo {
                 private Int count;
                 String label;
                 Int add(Int n, Int m) { return n + m; }
             }",
        )
        .unwrap();
        let root = ast.root().unwrap();
        assert_eq!(
            ast.dump(root),
            "<module name='m'>
  <class name='Foo'>
    <property access='private' type='Int' name='count'>
    <property access='public' type='String' name='label'>
    <function name='add' return-type='Int'>
      <var-decl type='Int' name='n'>
      <var-decl type='Int' name='m'>
      <block>
        <return>
          <binary-expr operator='+'>
            <var-ref name='n'>
            <var-ref name='m'>
"
        );
    }

    #[test]
    fn members_are_owned_by_their_class() {
        let ast = parse("class A { Int x; Void f() {} }").unwrap();
        let module = ast.root().unwrap();
        let class = ast.get(module).as_module().unwrap().classes()[0];
        assert_eq!(ast.parent(class), Some(module));
        for member in ast.children(class) {
            assert_eq!(ast.parent(member), Some(class));
        }
        let method = ast.get(class).as_class().unwrap().methods()[0];
        assert_eq!(ast.kind(method), NodeKind::Function);
        assert_eq!(ast.span(method), Span::new(1, 18, 11));
    }

    #[test]
    fn unterminated_class_reports_eof() {
        let err = parse("class A { Int x;").err().unwrap();
        assert_eq!(err.kind, SyntaxErrorKind::UnexpectedEof);
        assert_eq!(err.message, "expected '}', found end of file");
    }

    #[test]
    fn missing_semicolon_after_property() {
        let err = parse("class A {\n  Int x\n}").err().unwrap();
        assert_eq!(err.kind, SyntaxErrorKind::ExpectedToken);
        assert_eq!(err.span, Span::new(3, 1, 1));
        assert_eq!(err.message, "expected ';' or '(', found '}'");
    }

    #[test]
    fn access_modifier_on_method_is_rejected() {
        let err = parse("class A { public Int f() { return 1; } }").err().unwrap();
        assert_eq!(err.kind, SyntaxErrorKind::ExpectedClassMember);
    }

    #[test]
    fn type_must_be_identifier() {
        let err = parse("class A { 42 x; }").err().unwrap();
        assert_eq!(err.kind, SyntaxErrorKind::ExpectedType);
        assert_eq!(err.message, "expected type, found literal 42");
    }
}
