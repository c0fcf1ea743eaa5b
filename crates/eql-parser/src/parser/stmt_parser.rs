//! Statement parsing.

use eql_core::{SyntaxError, SyntaxErrorKind};

use super::Parser;
use crate::ast::{NodeId, NodeKind};
use crate::lexer::TokenKind;

impl<'ast> Parser<'ast> {
    pub(crate) fn parse_statement(&mut self) -> Result<NodeId, SyntaxError> {
        match self.peek().kind {
            TokenKind::LeftBrace => self.parse_block(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Identifier if self.peek_nth(1).kind == TokenKind::Identifier => self.parse_var_decl(),
            TokenKind::RightBrace | TokenKind::Else | TokenKind::Public | TokenKind::Private => {
                let token = *self.peek();
                Err(SyntaxError::new(
                    SyntaxErrorKind::ExpectedStatement,
                    token.span,
                    format!("expected statement, found {}", token.describe()),
                ))
            }
            _ => self.parse_expr_statement(),
        }
    }

    /// `{ statement* }`
    pub(crate) fn parse_block(&mut self) -> Result<NodeId, SyntaxError> {
        let start = self.expect(TokenKind::LeftBrace)?.span;
        self.enter()?;
        let block = self.ast.create_block([]);
        while !self.check(TokenKind::RightBrace) {
            if self.is_eof() {
                return Err(self.unexpected(TokenKind::RightBrace.description()));
            }
            let statement = self.parse_statement()?;
            self.ast.add_statement(block, statement);
        }
        self.expect(TokenKind::RightBrace)?;
        self.leave();
        Ok(self.finish(block, start))
    }

    /// `Type name ( = expr )? ;`
    fn parse_var_decl(&mut self) -> Result<NodeId, SyntaxError> {
        let start = self.peek().span;
        let type_name = self.parse_type_name()?;
        let name = self.expect_identifier()?;
        let initializer = if self.eat(TokenKind::Equal).is_some() {
            Some(self.parse_expr(0)?)
        } else {
            None
        };
        if !self.check(TokenKind::Semicolon) {
            let expected = if initializer.is_some() { "';'" } else { "';' or '='" };
            return Err(self.unexpected(expected));
        }
        self.advance();
        let decl = self.ast.create_var_decl(type_name.lexeme, name.lexeme, initializer);
        Ok(self.finish(decl, start))
    }

    /// `if ( expr ) block ( else ( if | block ) )?`
    fn parse_if(&mut self) -> Result<NodeId, SyntaxError> {
        let start = self.expect(TokenKind::If)?.span;
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_expr(0)?;
        self.expect(TokenKind::RightParen)?;
        let then_block = self.parse_block()?;

        let else_branch = if self.eat(TokenKind::Else).is_some() {
            if self.check(TokenKind::If) {
                self.enter()?;
                let nested = self.parse_if()?;
                self.leave();
                Some(nested)
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        let node = self.ast.create_if(condition, then_block, else_branch);
        Ok(self.finish(node, start))
    }

    /// `while ( expr ) block`
    fn parse_while(&mut self) -> Result<NodeId, SyntaxError> {
        let start = self.expect(TokenKind::While)?.span;
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_expr(0)?;
        self.expect(TokenKind::RightParen)?;
        let body = self.parse_block()?;
        let node = self.ast.create_while(condition, body);
        Ok(self.finish(node, start))
    }

    /// `return expr? ;`
    fn parse_return(&mut self) -> Result<NodeId, SyntaxError> {
        let start = self.expect(TokenKind::Return)?.span;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr(0)?)
        };
        self.expect(TokenKind::Semicolon)?;
        let node = self.ast.create_return(value);
        Ok(self.finish(node, start))
    }

    /// `expr ;` or `target = expr ;`
    fn parse_expr_statement(&mut self) -> Result<NodeId, SyntaxError> {
        let start = self.peek().span;
        let expr = self.parse_expr(0)?;

        if let Some(equal) = self.eat(TokenKind::Equal) {
            if !matches!(self.ast.kind(expr), NodeKind::VarRef | NodeKind::PropertyRef) {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::InvalidAssignmentTarget,
                    self.ast.span(expr).merge(equal.span),
                    "left side of '=' must be a variable or property",
                ));
            }
            let value = self.parse_expr(0)?;
            self.expect(TokenKind::Semicolon)?;
            let node = self.ast.create_assignment(expr, value);
            return Ok(self.finish(node, start));
        }

        self.expect(TokenKind::Semicolon)?;
        let node = self.ast.create_expr_stmt(expr);
        Ok(self.finish(node, start))
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use eql_core::{Span, SyntaxError, SyntaxErrorKind};
    use pretty_assertions::assert_eq;

    use crate::ast::{Ast, NodeKind};
    use crate::parser::Parser;

    fn parse(source: &str) -> Result<Ast, SyntaxError> {
        let arena = Bump::new();
        Parser::new(source, &arena)?.parse_module("q")
    }

    fn dump(source: &str) -> String {
        let ast = parse(source).unwrap();
        ast.dump(ast.root().unwrap())
    }

    #[test]
    fn top_level_statements_form_main_function() {
        assert_eq!(
            dump("Int total = 0;\ntotal = total + 1;\nreturn total;"),
            "<module name='q'>
  <function name='' return-type=''>
    <block>
      <var-decl type='Int' name='total'>
        <int-literal value='0'>
      <assignment>
        <var-ref name='total'>
        <binary-expr operator='+'>
          <var-ref name='total'>
          <int-literal value='1'>
      <return>
        <var-ref name='total'>
"
        );
    }

    #[test]
    fn classes_and_statements_mix() {
        assert_eq!(
            dump("class A {}\nreturn new A();\nclass B {}"),
            "<module name='q'>
  <class name='A'>
  <class name='B'>
  <function name='' return-type=''>
    <block>
      <return>
        <new type='A'>
"
        );
    }

    #[test]
    fn if_else_chain_and_while() {
        assert_eq!(
            dump("if (a) { } else if (b) { return; } else { c(); }\nwhile (x < 3) { x = x + 1; }"),
            "<module name='q'>
  <function name='' return-type=''>
    <block>
      <if>
        <var-ref name='a'>
        <block>
        <if>
          <var-ref name='b'>
          <block>
            <return>
          <block>
            <expr-stmt>
              <method-call name='c'>
      <while>
        <binary-expr operator='<'>
          <var-ref name='x'>
          <int-literal value='3'>
        <block>
          <assignment>
            <var-ref name='x'>
            <binary-expr operator='+'>
              <var-ref name='x'>
              <int-literal value='1'>
"
        );
    }

    #[test]
    fn property_assignment() {
        let ast = parse("p.name = \"x\";").unwrap();
        let main = ast.get(ast.root().unwrap()).as_module().unwrap().main_function().unwrap();
        let body = ast.get(main).as_function().unwrap().body().unwrap();
        let stmt = ast.get(body).as_block().unwrap().statements()[0];
        let assignment = ast.get(stmt).as_assignment().unwrap();
        assert_eq!(ast.kind(assignment.target()), NodeKind::PropertyRef);
        assert_eq!(ast.parent(assignment.value()), Some(stmt));
    }

    #[test]
    fn invalid_assignment_target() {
        let err = parse("f() = 3;").err().unwrap();
        assert_eq!(err.kind, SyntaxErrorKind::InvalidAssignmentTarget);
        assert_eq!(err.span, Span::new(1, 1, 5));
    }

    #[test]
    fn unterminated_block() {
        let err = parse("if (a) {\n  b();\n").err().unwrap();
        assert_eq!(err.kind, SyntaxErrorKind::UnexpectedEof);
        assert_eq!(err.message, "expected '}', found end of file");
    }

    #[test]
    fn misplaced_else() {
        let err = parse("else { }").err().unwrap();
        assert_eq!(err.kind, SyntaxErrorKind::ExpectedStatement);
    }

    #[test]
    fn var_decl_without_semicolon() {
        let err = parse("Int x = 1 Int y;").err().unwrap();
        assert_eq!(err.message, "expected ';', found identifier 'Int'");
        assert_eq!(err.span, Span::new(1, 11, 3));
    }
}
