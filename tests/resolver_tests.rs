//! Symbol and type resolution over whole modules.


use eql::{CompileError, DataType, EqlError, Schema, Span};
use eql_core::{CompileErrorCategory, SymbolKind};
use eql_parser::ast::Binding;
use pretty_assertions::assert_eq;
use test_harness::TestHarness;

fn compile_errors(source: &str) -> Vec<CompileError> {
    match eql::check("m", source, &Schema::new()) {
        Err(EqlError::Compile(errors)) => errors.into_vec(),
        other => panic!("expected compile errors, got {other:?}"),
    }
}

#[test]
fn unresolved_identifier_names_symbol_and_position() {
    let errors = compile_errors("class A {\n  Int f() {\n    return count + 1;\n  }\n}");
    assert_eq!(
        errors,
        vec![CompileError::UnresolvedSymbol {
            name: "count".into(),
            span: Span::new(3, 12, 5),
        }]
    );
}

#[test]
fn unresolved_identifier_stops_before_code_generation() {
    let err = eql::compile("m", "return nothing;", &Schema::new()).unwrap_err();
    assert!(matches!(err, EqlError::Compile(_)), "{err:?}");
}

#[test]
fn duplicate_class_names() {
    let errors = compile_errors("class Foo {}\nclass Foo { Int x; }");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        CompileError::DuplicateDefinition { kind, name, span, first } => {
            assert_eq!(*kind, SymbolKind::Class);
            assert_eq!(name, "Foo");
            assert_eq!(span.line, 2);
            assert_eq!(first.line, 1);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn every_error_in_a_file_is_reported_in_order() {
    let source = TestHarness::new().source("errors.eql");
    let errors = compile_errors(&source);
    let categories: Vec<CompileErrorCategory> = errors.iter().map(CompileError::category).collect();
    assert_eq!(
        categories,
        vec![
            CompileErrorCategory::DuplicateDefinition,
            CompileErrorCategory::Type,
            CompileErrorCategory::Type,
            CompileErrorCategory::UnresolvedSymbol,
        ]
    );
    let lines: Vec<u32> = errors.iter().map(|e| e.span().line).collect();
    assert_eq!(lines, vec![3, 5, 11, 12]);
    assert!(errors[2].to_string().contains("expected 'String', found 'Int'"), "{}", errors[2]);
}

#[test]
fn resolution_is_idempotent() {
    let source = TestHarness::new().source("big_spenders.eql");
    let table = TestHarness::new().users();
    let mut ast = eql::parse("big_spenders", &source).unwrap();
    let module = ast.root().unwrap();
    let compiler = eql::Compiler::new();

    compiler.resolve(&mut ast, module, eql::Table::schema(&table)).unwrap();
    let first: Vec<_> = ast.iter().map(|(id, _)| (id, ast.annotation(id).cloned())).collect();
    compiler.resolve(&mut ast, module, eql::Table::schema(&table)).unwrap();
    let second: Vec<_> = ast.iter().map(|(id, _)| (id, ast.annotation(id).cloned())).collect();
    assert_eq!(first, second);
}

#[test]
fn references_bind_outward_through_scopes() {
    let source = "class Box {
                      Int size;
                      Int grow(Int by) {
                          Int size2 = size + by;
                          return size2;
                      }
                  }
                  Box b = new Box();
                  return b.grow(event.timestamp);";
    let mut ast = eql::parse("m", source).unwrap();
    let module = ast.root().unwrap();
    let resolution = eql::Compiler::new().resolve(&mut ast, module, &Schema::new()).unwrap();
    assert_eq!(resolution.main_return_type, DataType::Int);

    let mut bindings = Vec::new();
    for (id, node) in ast.iter() {
        if let Some(name) = node.as_var_ref().map(|v| v.name.clone()) {
            let binding = ast.annotation(id).and_then(|a| a.binding.clone()).unwrap();
            bindings.push((name, binding));
        }
    }
    bindings.sort_by(|a, b| a.0.cmp(&b.0));
    let kinds: Vec<(&str, &str)> = bindings
        .iter()
        .map(|(name, binding)| {
            let kind = match binding {
                Binding::Local(_) => "local",
                Binding::Property { .. } => "property",
                Binding::Event => "event",
                _ => "other",
            };
            (name.as_str(), kind)
        })
        .collect();
    assert_eq!(
        kinds,
        vec![("b", "local"), ("by", "local"), ("event", "event"), ("size", "property"), ("size2", "local")]
    );
}

#[test]
fn event_properties_come_from_the_schema() {
    let table = TestHarness::new().users();
    let schema = eql::Table::schema(&table);
    let resolution = eql::check("m", "return event.spend * event.age;", schema).unwrap();
    assert_eq!(resolution.main_return_type, DataType::Float);

    let err = eql::check("m", "return event.height;", schema).unwrap_err();
    assert!(err.to_string().contains("type 'Event' has no property named 'height'"), "{err}");
}
