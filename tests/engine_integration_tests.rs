use serde_json::json;
use statil::{CompilerSettings, Error, Locals, Statil};
use test_log::test;

fn engine(files: &[(&str, &str)]) -> Statil {
    let mut engine = Statil::new();
    for (path, source) in files {
        engine.register(source, path).unwrap();
    }
    engine
}

#[test]
fn test_chain_wraps_leaf_in_every_index() {
    let engine = engine(&[
        ("index.html", "outer {{ $content }}"),
        ("docs/index.html", "inner {{ $content }}"),
        ("docs/guide/page.html", "leaf"),
    ]);
    let out = engine.render("docs/guide/page.html", &Locals::new()).unwrap();
    assert_eq!(out["docs/guide/page"], "outer inner leaf");
}

#[test]
fn test_rendering_twice_gives_same_output() {
    let engine = engine(&[
        ("index.html", "<< entitle('Site') >>{{ $title }}: {{ $content }}"),
        ("page.html", "<< entitle('Page') >>body"),
    ]);
    let base = Locals::from_value(json!({"site": "x"})).unwrap();
    let first = engine.render_all(&base).unwrap();
    let second = engine.render_all(&base).unwrap();
    assert_eq!(first, second);
    assert_eq!(first["page"], "Site | Page: body");
}

#[test]
fn test_echo_inherits_from_nested_legends() {
    let engine = engine(&[
        (
            "team/meta.yaml",
            "files:\n  - name: member\n    echo: people\npeople:\n  - name: ada\n    role: lead\n  - name: alan\n",
        ),
        ("team/member.html", "{{ name }}={{ role ?? 'none' }}"),
    ]);
    let out = engine.render_all(&Locals::new()).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out["team/ada"], "ada=lead");
    assert_eq!(out["team/alan"], "alan=none");
}

#[test]
fn test_meta_is_unique_per_directory() {
    let mut engine = Statil::new();
    engine.register("files: []", "docs/meta.yaml").unwrap();
    let err = engine.register("{\"files\": []}", "docs/meta.json").unwrap_err();
    assert!(matches!(err, Error::DuplicateMeta { .. }));
    engine.register("{}", "blog/meta.json").unwrap();
}

#[test]
fn test_ignore_pattern_applies_to_basename() {
    let engine = engine(&[
        ("partials/meta.yaml", "ignore: ^nav"),
        ("partials/nav.html", "nav"),
        ("partials/footer.html", "footer"),
        ("navigation.html", "top"),
    ]);
    assert!(engine.is_ignored("partials/nav").unwrap());
    assert!(!engine.is_ignored("partials/footer").unwrap());
    assert!(!engine.is_ignored("navigation").unwrap());

    let out = engine.render_all(&Locals::new()).unwrap();
    let mut paths: Vec<_> = out.keys().cloned().collect();
    paths.sort();
    assert_eq!(paths, vec!["navigation", "partials/footer"]);
}

#[test]
fn test_active_matches_whole_segments() {
    let engine = engine(&[
        ("index.html", "[{{ active('blog') }}|{{ act('blog/post') }}]{{ $content }}"),
        ("blog/post.html", "post"),
        ("blogroll.html", "roll"),
    ]);
    let out = engine.render_all(&Locals::new()).unwrap();
    assert_eq!(out["blog/post"], r#"[active|class="active"]post"#);
    assert_eq!(out["blogroll"], "[|]roll");
    assert_eq!(out["index"], "[|]");
}

#[test]
fn test_custom_delimiters_and_context_name() {
    let settings = CompilerSettings::new(
        r"<%=\s*([\s\S]+?)\s*%>",
        r"<%\s*([\s\S]+?)\s*%>",
        None,
        "ctx",
    )
    .unwrap();
    let mut engine = Statil::builder().settings(settings).build();
    engine
        .register(
            "<% for (const item of ctx.items) { %><%= item %>,<% } %>{{ untouched }}",
            "list.html",
        )
        .unwrap();
    let base = Locals::from_value(json!({"items": ["a", "b"]})).unwrap();
    let out = engine.render("list", &base).unwrap();
    assert_eq!(out["list"], "a,b,{{ untouched }}");
}

#[test]
fn test_meta_changes_are_visible_to_later_renders() {
    let mut engine = engine(&[
        ("docs/meta.yaml", "files:\n  - name: page\n    label: before\n"),
        ("docs/page.html", "{{ label }}"),
    ]);
    assert_eq!(engine.render("docs/page", &Locals::new()).unwrap()["docs/page"], "before");

    let meta = engine.meta_for_mut("docs/page").unwrap();
    let legend = meta.files.iter_mut().find(|legend| legend.name() == Some("page")).unwrap();
    legend.insert("label", "after");
    assert_eq!(engine.render("docs/page", &Locals::new()).unwrap()["docs/page"], "after");
}
