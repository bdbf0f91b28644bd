//! Integration tests for the parse pipeline.

use docbridge::model::{BlockKind, MetaValue, ResourceKind};
use docbridge::parser::{MarkdownParser, ParseOptions, PlainTextParser};
use docbridge::render::markup::placeholder_ids;
use docbridge::{parse_str, DiagnosticKind, DocumentModel, DocumentParser, ResourceRegistry};

fn parse_md(input: &str) -> docbridge::ParsedDocument {
    let mut registry = ResourceRegistry::in_memory();
    MarkdownParser::new()
        .parse(input.as_bytes(), &ParseOptions::default(), &mut registry)
        .unwrap()
}

#[test]
fn test_mermaid_fence_becomes_diagram_asset() {
    let input = "# Title\n\nIntro paragraph.\n\n```mermaid\ngraph TD\nA-->B\n```\n";
    let parsed = parse_md(input);
    let model = &parsed.model;

    let kinds: Vec<BlockKind> = model.blocks.iter().map(|b| b.kind).collect();
    assert_eq!(
        kinds,
        vec![BlockKind::Heading, BlockKind::Paragraph, BlockKind::DiagramBlock]
    );
    assert_eq!(model.blocks[0].level, Some(1));
    assert_eq!(model.blocks[0].content, "Title");
    assert_eq!(model.blocks[1].content, "Intro paragraph.");
    assert_eq!(model.blocks[2].content, "graph TD\nA-->B");

    assert_eq!(model.assets.len(), 1);
    let record = &model.assets[0];
    assert_eq!(record.kind, ResourceKind::Diagram);
    assert_eq!(record.inline_content.as_deref(), Some("graph TD\nA-->B"));

    assert_eq!(placeholder_ids(&model.markup_layer), vec![record.id.clone()]);
    assert!(!model.markup_layer.contains("A--&gt;B"));
    assert!(parsed.diagnostics.is_empty());
}

#[test]
fn test_front_matter_round_trip() {
    let input = "---\ntitle: Release Plan\nauthor: Dana\nversion: 3\ndraft: false\ntags: [infra, q3]\n---\n# Heading\n";
    let parsed = parse_md(input);
    let meta = &parsed.model.meta;

    let keys: Vec<&str> = meta.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["author", "draft", "tags", "title", "version"]);
    assert_eq!(meta.get("title"), Some(&MetaValue::from("Release Plan")));
    assert_eq!(meta.get("author"), Some(&MetaValue::from("Dana")));
    assert_eq!(meta.get("version"), Some(&MetaValue::Integer(3)));
    assert_eq!(meta.get("draft"), Some(&MetaValue::Bool(false)));
    assert_eq!(meta.tags(), vec!["infra", "q3"]);

    // Body lines are numbered against the original input.
    assert_eq!(parsed.model.blocks[0].source_line, 7);
}

#[test]
fn test_malformed_front_matter_keeps_text() {
    let input = "---\n- just\n- a list\n---\nBody text\n";
    let parsed = parse_md(input);
    assert!(parsed.has_diagnostic(DiagnosticKind::MalformedFrontMatter));
    assert_eq!(parsed.model.meta.len(), 1);
    assert_eq!(parsed.model.title(), "");
    assert!(parsed.model.plain_text().contains("Body text"));
    assert!(parsed.model.plain_text().contains("just"));
}

#[test]
fn test_heuristic_title_and_tags() {
    let parsed = parse_md("tags: [a, b]\n\n```\n# not a title\n```\n\n# Real Title\n");
    assert_eq!(parsed.model.title(), "Real Title");
    assert_eq!(parsed.model.meta.tags(), vec!["a", "b"]);
}

#[test]
fn test_title_key_always_present() {
    let parsed = parse_str("Just a paragraph.\n", "md").unwrap();
    assert_eq!(parsed.model.meta.get("title"), Some(&MetaValue::from("")));

    let value: serde_json::Value = serde_json::from_str(&parsed.model.to_json().unwrap()).unwrap();
    assert_eq!(value["meta"]["title"], "");

    let declared = parse_md("---\nauthor: Dana\n---\nBody\n");
    let keys: Vec<&str> = declared.model.meta.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["author", "title"]);
}

#[test]
fn test_source_lines_monotonic() {
    let input = "\
# A

para one
continues

- item
  - nested
1. ordered

| x | y |
|---|---|
| 1 | 2 |

```python
print('hi')
```

## B
text
";
    let parsed = parse_md(input);
    let lines: Vec<usize> = parsed.model.blocks.iter().map(|b| b.source_line).collect();
    assert!(lines.windows(2).all(|w| w[0] <= w[1]), "{:?}", lines);
    assert_eq!(lines, vec![0, 2, 5, 7, 9, 13, 17, 18]);
}

#[test]
fn test_n_code_fences_yield_n_code_records() {
    let input = "\
```rust
fn a() {}
```

```python
def b(): pass
```

```sql
select 1;
```
";
    let parsed = parse_md(input);
    let model = &parsed.model;
    assert_eq!(model.blocks_of(BlockKind::CodeBlock).count(), 3);
    assert_eq!(model.blocks_of(BlockKind::DiagramBlock).count(), 0);

    let code: Vec<_> = model
        .assets
        .iter()
        .filter(|r| r.kind == ResourceKind::Code)
        .collect();
    assert_eq!(code.len(), 3);
    let ids: Vec<&str> = code.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["code_000", "code_001", "code_002"]);
    assert_eq!(placeholder_ids(&model.markup_layer), ids);
}

#[test]
fn test_semantics_keys() {
    let input = "# One\n\n- a\n\n| k | v |\n|---|---|\n| x | y |\n\n## Two\n\n1. first\n";
    let parsed = parse_md(input);
    let sem = &parsed.model.semantics;

    assert_eq!(sem.section_id["sec-1"].title, "One");
    assert_eq!(sem.section_id["sec-2"].position, 8);
    assert_eq!(sem.list_type["list-0"], "unordered");
    assert_eq!(sem.list_type["list-1"], "ordered");
    assert_eq!(sem.table_type["table-0"], "key_value");
    assert!(parsed.model.markup_layer.contains("<h2 id=\"sec-2\">Two</h2>"));
}

#[test]
fn test_image_structure_items_and_placeholders() {
    let input = "# Pics\n\nA ![cat](./cat.png) and ![dog](dog.png)\n\n![cat again](cat.png)\n";
    let parsed = parse_md(input);
    let model = &parsed.model;

    let images: Vec<_> = model
        .structure
        .iter()
        .filter(|s| s.item_type == docbridge::model::StructureType::Image)
        .collect();
    assert_eq!(images.len(), 3);
    assert_eq!(images[2].position, 4);

    assert_eq!(model.assets.len(), 2);
    assert_eq!(
        placeholder_ids(&model.markup_layer),
        vec!["img_000", "img_001", "img_000"]
    );
}

#[test]
fn test_wire_form_round_trip() {
    let parsed = parse_str("# T\n\n```js\nlet x;\n```\n", "md").unwrap();
    let json = parsed.model.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let mut fields: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    fields.sort_unstable();
    assert_eq!(
        fields,
        vec!["assets", "blocks", "markup_layer", "meta", "semantics", "structure", "version_history"]
    );

    let back = DocumentModel::from_json(&json).unwrap();
    assert_eq!(back, parsed.model);
}

#[test]
fn test_plain_text_prose_diagram() {
    let input = "Architecture\n\nDiagram:\nsequenceDiagram\nAlice->>Bob: Hello\n\nThat is all.\n";
    let mut registry = ResourceRegistry::in_memory();
    let parsed = PlainTextParser::new()
        .parse(input.as_bytes(), &ParseOptions::default(), &mut registry)
        .unwrap();

    assert_eq!(parsed.model.title(), "Architecture");
    let diagram = parsed
        .model
        .blocks_of(BlockKind::DiagramBlock)
        .next()
        .unwrap();
    assert_eq!(diagram.content, "sequenceDiagram\nAlice->>Bob: Hello");
    assert_eq!(diagram.source_line, 2);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_extraction_disabled_keeps_code_inline() {
    let mut registry = ResourceRegistry::in_memory();
    let options = ParseOptions::default().with_assets(false);
    let parsed = MarkdownParser::new()
        .parse(b"```rust\nfn a() {}\n```\n", &options, &mut registry)
        .unwrap();
    assert!(parsed.model.assets.is_empty());
    assert!(parsed
        .model
        .markup_layer
        .contains("<pre><code class=\"language-rust\">fn a() {}</code></pre>"));
}

#[test]
fn test_soft_anomalies_do_not_abort() {
    let input = "| a | b |\n| 1 | 2 |\n\n```\n\n```\n\n```rust\nunclosed\n";
    let parsed = parse_md(input);
    assert!(parsed.has_diagnostic(DiagnosticKind::MalformedTable));
    assert!(parsed.has_diagnostic(DiagnosticKind::EmptyCodeBlock));
    assert!(parsed.has_diagnostic(DiagnosticKind::UnclosedFence));
    assert_eq!(parsed.model.blocks_of(BlockKind::Table).count(), 1);
    assert_eq!(parsed.model.blocks_of(BlockKind::CodeBlock).count(), 2);
}
