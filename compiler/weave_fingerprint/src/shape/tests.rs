use pretty_assertions::assert_eq;

use super::{DeclaredType, ShapeWalker, TypeKind};

fn types(src: &str) -> Vec<(String, TypeKind, bool)> {
    ShapeWalker::walk(src)
        .shape
        .types
        .into_iter()
        .map(|DeclaredType { name, kind, is_partial }| (name.as_str().to_string(), kind, is_partial))
        .collect()
}

fn hashes(src: &str) -> (u64, u64) {
    let out = ShapeWalker::walk(src);
    (out.declaration_hash, out.body_hash)
}

// ─── Type Discovery ──────────────────────────────────────────────

#[test]
fn nested_namespaces_and_types() {
    let src = "namespace A.B { namespace C { class X { struct Y {} } } interface I {} }";
    assert_eq!(
        types(src),
        vec![
            ("A.B.C.X".to_string(), TypeKind::Class, false),
            ("A.B.C.X.Y".to_string(), TypeKind::Struct, false),
            ("A.B.I".to_string(), TypeKind::Interface, false),
        ]
    );
}

#[test]
fn file_scoped_namespace() {
    let src = "namespace App.Core;\npartial class Service {}\nenum Mode { A, B }";
    assert_eq!(
        types(src),
        vec![
            ("App.Core.Service".to_string(), TypeKind::Class, true),
            ("App.Core.Mode".to_string(), TypeKind::Enum, false),
        ]
    );
}

#[test]
fn generic_arity_suffix() {
    let src = "partial class Map<K, V> where K : notnull {} partial struct Box<T> {}";
    assert_eq!(
        types(src),
        vec![
            ("Map`2".to_string(), TypeKind::Class, true),
            ("Box`1".to_string(), TypeKind::Struct, true),
        ]
    );
}

#[test]
fn records_with_and_without_body() {
    let src = "record Point(int X, int Y); partial record class Shape { } record struct Pair(int A);";
    assert_eq!(
        types(src),
        vec![
            ("Point".to_string(), TypeKind::Record, false),
            ("Shape".to_string(), TypeKind::Record, true),
            ("Pair".to_string(), TypeKind::Record, false),
        ]
    );
}

#[test]
fn constraint_keywords_are_not_types() {
    let src = "class C { void M<T>() where T : class { } delegate void D(); }";
    assert_eq!(types(src), vec![("C".to_string(), TypeKind::Class, false)]);
}

#[test]
fn attributes_are_collected() {
    let src = "[CompileTime, Other(1)] class C { [field: global::Aspects.RunTimeOrCompileTimeAttribute] int x; }";
    let shape = ShapeWalker::walk(src).shape;
    assert_eq!(
        shape.attributes,
        vec![
            "CompileTime".to_string(),
            "Other".to_string(),
            "RunTimeOrCompileTimeAttribute".to_string(),
        ]
    );
}

#[test]
fn using_directives_are_collected() {
    let src = "using System; global using static Aspects.Advice; using Alias = Aspects.Code; class C {}";
    let shape = ShapeWalker::walk(src).shape;
    assert_eq!(
        shape.usings,
        vec![
            "System".to_string(),
            "Aspects.Advice".to_string(),
            "Aspects.Code".to_string(),
        ]
    );
}

// ─── Declaration vs Body ─────────────────────────────────────────

#[test]
fn method_body_edit_only_changes_body_hash() {
    let (decl_a, body_a) = hashes("class C { int M(int a) { return a; } }");
    let (decl_b, body_b) = hashes("class C { int M(int a) { return a + 1; } }");
    assert_eq!(decl_a, decl_b);
    assert_ne!(body_a, body_b);
}

#[test]
fn signature_edit_changes_declaration_hash() {
    let (decl_a, _) = hashes("class C { int M(int a) { return a; } }");
    let (decl_b, _) = hashes("class C { int M(long a) { return a; } }");
    assert_ne!(decl_a, decl_b);
}

#[test]
fn expression_body_is_body() {
    let (decl_a, body_a) = hashes("class C { int P => 1; int M() => 2; }");
    let (decl_b, body_b) = hashes("class C { int P => 3; int M() => 4; }");
    assert_eq!(decl_a, decl_b);
    assert_ne!(body_a, body_b);
}

#[test]
fn accessor_bodies_are_body() {
    let (decl_a, body_a) = hashes("class C { int P { get { return 1; } set => x = value; } }");
    let (decl_b, body_b) = hashes("class C { int P { get { return 2; } set => y = value; } }");
    assert_eq!(decl_a, decl_b);
    assert_ne!(body_a, body_b);
}

#[test]
fn field_and_property_initializers_are_declaration() {
    let (field_a, _) = hashes("class C { int x = 1; }");
    let (field_b, _) = hashes("class C { int x = 2; }");
    assert_ne!(field_a, field_b);

    let (prop_a, _) = hashes("class C { int P { get; } = 1; }");
    let (prop_b, _) = hashes("class C { int P { get; } = 2; }");
    assert_ne!(prop_a, prop_b);
}

#[test]
fn lambda_initializer_stays_in_declaration() {
    let (decl_a, body_a) = hashes("class C { Func<int, int> f = x => { return x; }; }");
    let (decl_b, body_b) = hashes("class C { Func<int, int> f = x => { return x * 2; }; }");
    assert_ne!(decl_a, decl_b);
    assert_eq!(body_a, body_b);
}

#[test]
fn enum_members_are_declaration() {
    let (decl_a, _) = hashes("enum E { A, B }");
    let (decl_b, _) = hashes("enum E { A, B, C }");
    assert_ne!(decl_a, decl_b);
}

#[test]
fn adding_a_type_changes_declaration_hash() {
    let (decl_a, _) = hashes("class C{}");
    let (decl_b, _) = hashes("class C{} partial class D{}");
    assert_ne!(decl_a, decl_b);
}

// ─── Malformed Input ─────────────────────────────────────────────

#[test]
fn malformed_input_terminates() {
    for src in [
        "}}}",
        "class",
        "class {",
        "namespace",
        "namespace A =>",
        "class C { int P { get",
        "class C { void M( { }",
        "int x = ",
        "[A(",
        "=> => ;",
        "record class",
    ] {
        let _ = ShapeWalker::walk(src);
    }
}

#[test]
fn unclosed_type_is_still_recorded() {
    assert_eq!(
        types("namespace N { class C { void M() {"),
        vec![("N.C".to_string(), TypeKind::Class, false)]
    );
}
