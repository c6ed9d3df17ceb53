use super::fixtures::ContainerBuilder;
use crate::report::{Action, ReportFormat, VisualCategory, VisualRef};
use crate::{DecodeOptions, WarningKind, decode_bytes};
use serde_json::{Value, json};

const PAGES: &str = "Report/definition/pages/";

fn visual(name: &str, visual_type: &str, extra: Value) -> Value {
    let mut visual = json!({"visualType": visual_type});
    if let (Value::Object(target), Value::Object(source)) = (&mut visual, extra) {
        target.extend(source);
    }
    json!({
        "$schema": "https://developer.microsoft.com/json-schemas/fabric/item/report/definition/visualContainer/1.0.0/schema.json",
        "name": name,
        "position": {"x": 0, "y": 0, "z": 1, "width": 320, "height": 180},
        "visual": visual
    })
}

fn page(name: &str, display: &str) -> Value {
    json!({"name": name, "displayName": display, "displayOption": "FitToPage", "width": 1280, "height": 720})
}

fn container() -> Vec<u8> {
    ContainerBuilder::new()
        .utf16("Version", "4.0")
        .json8("Report/definition/report.json", &json!({
            "themeCollection": {"baseTheme": {"name": "CY24SU06"}},
            "publicCustomVisuals": ["sankey02"]
        }))
        .json8(&format!("{}pages.json", PAGES), &json!({"pageOrder": ["detail", "home"], "activePageName": "home"}))
        .json8(&format!("{}home/page.json", PAGES), &page("home", "Home"))
        .json8(
            &format!("{}home/visuals/nav/visual.json", PAGES),
            &visual("nav", "actionButton", json!({"visualContainerObjects": {"visualLink": [{"properties": {
                "show": {"expr": {"Literal": {"Value": "true"}}},
                "navigationSection": {"expr": {"Literal": {"Value": "'detail'"}}}
            }}]}})),
        )
        .json8(
            &format!("{}home/visuals/bm/visual.json", PAGES),
            &visual("bm", "actionButton", json!({"visualContainerObjects": {"visualLink": [{"properties": {
                "bookmark": {"expr": {"Literal": {"Value": "'b1'"}}}
            }}]}})),
        )
        .json8(&format!("{}detail/page.json", PAGES), &page("detail", "Detail"))
        .json8(
            &format!("{}detail/visuals/flow/visual.json", PAGES),
            &visual("flow", "sankey02", json!({"query": {"queryState": {"Values": {"projections": [
                {"field": {}, "queryRef": "Sales.Amount"}
            ]}}}})),
        )
        .json8(
            &format!("{}detail/visuals/styled/visual.json", PAGES),
            &visual("styled", "lineChart", json!({"objects": {
                "legend": [{"properties": {"position": {"expr": {"Literal": {"Value": "'Top'"}}}}}],
                "lineStyles": [{"properties": {"strokeWidth": {"expr": {"Literal": {"Value": "3D"}}}}}]
            }})),
        )
        .json8("Report/definition/bookmarks/bookmarks.json", &json!({"items": [
            {"name": "b1"},
            {"name": "g1", "displayName": "Views", "children": ["b2"]}
        ]}))
        .json8("Report/definition/bookmarks/b1.bookmark.json", &json!({
            "name": "b1", "displayName": "Start", "explorationState": {"activeSection": "home"}
        }))
        .json8("Report/definition/bookmarks/b2.bookmark.json", &json!({
            "name": "b2", "displayName": "Drill", "explorationState": {"activeSection": "detail"}
        }))
        .build()
}

#[test]
fn folder_based_report() {
    let doc = decode_bytes(container(), &DecodeOptions::default()).expect("decode");
    let report = &doc.report;

    assert!(doc.warnings.is_empty(), "unexpected warnings: {:?}", doc.warnings);
    assert_eq!(report.format, ReportFormat::Enhanced);

    let names: Vec<&str> = report.pages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["detail", "home"]);
    assert_eq!(report.visual_count(), 4);

    let flow = report.page("detail").and_then(|p| p.visual("flow")).expect("flow");
    assert_eq!(flow.category, VisualCategory::CustomVisual);
    assert_eq!(flow.fields[0].query_ref, "Sales.Amount");
    assert_eq!(flow.geometry.width, 320.0);

    let nav = report.page("home").and_then(|p| p.visual("nav")).expect("nav");
    assert_eq!(nav.action, Action::PageNavigation { page: "detail".into() });
    let link = &nav.properties.container["visualLink"];
    assert_eq!(link.len(), 1);
    assert!(link[0].get("navigationSection").is_some());
    assert!(flow.properties.is_empty());

    let styled = report.page("detail").and_then(|p| p.visual("styled")).expect("styled");
    assert_eq!(styled.category, VisualCategory::Chart);
    assert_eq!(styled.display_type, "Line Chart");
    let objects = &styled.properties.objects;
    assert_eq!(objects.len(), 2);
    assert_eq!(objects["legend"][0]["position"]["expr"]["Literal"]["Value"], "'Top'");
    assert!(objects.contains_key("lineStyles"));

    let start = report.bookmark("b1").expect("b1");
    assert_eq!(start.group, "Ungrouped");
    assert_eq!(start.triggers, [VisualRef { page: "home".into(), visual: "bm".into() }]);
    assert_eq!(report.bookmark("Drill").expect("b2").group, "g1");

    assert_eq!(doc.metadata.version.as_deref(), Some("4.0"));
}

#[test]
fn folder_based_report_wins_over_legacy_layout() {
    let mut builder = ContainerBuilder::new().json16("Report/Layout", &json!({"sections": []}));
    builder = builder
        .json8(&format!("{}only/page.json", PAGES), &page("only", "Only"))
        .json8(&format!("{}only/visuals/t/visual.json", PAGES), &visual("t", "textbox", json!({})));
    let doc = decode_bytes(builder.build(), &DecodeOptions::default()).expect("decode");
    assert_eq!(doc.report.format, ReportFormat::Enhanced);
    assert_eq!(doc.report.pages.len(), 1);
}

#[test]
fn visuals_without_page_file() {
    let bytes = ContainerBuilder::new()
        .json8(&format!("{}a/page.json", PAGES), &page("a", "A"))
        .json8(&format!("{}orphan/visuals/v/visual.json", PAGES), &visual("v", "card", json!({})))
        .build();
    let doc = decode_bytes(bytes, &DecodeOptions::default()).expect("decode");
    assert_eq!(doc.report.pages.len(), 1);
    assert_eq!(doc.warnings.len(), 1);
    assert_eq!(doc.warnings[0].kind, WarningKind::EntryNotFound);
}

#[test]
fn dangling_page_navigation() {
    let bytes = ContainerBuilder::new()
        .json8(&format!("{}a/page.json", PAGES), &page("a", "A"))
        .json8(
            &format!("{}a/visuals/v/visual.json", PAGES),
            &visual("v", "actionButton", json!({"visualContainerObjects": {"visualLink": [{"properties": {
                "navigationSection": {"expr": {"Literal": {"Value": "'nowhere'"}}}
            }}]}})),
        )
        .build();
    let doc = decode_bytes(bytes, &DecodeOptions::default()).expect("decode");
    assert_eq!(doc.warnings_of(WarningKind::UnresolvedReference).count(), 1);
}
