use postpress::config::SiteConfig;
use postpress::helpers::{html_unescape, strip_html};
use postpress::pipeline::{Pipeline, PipelineError};
use postpress::publish::{PublishOutcome, Publisher, PAGE_FILE};
use postpress::render::RenderError;
use postpress::Site;
use std::fs;
use tempfile::TempDir;

const SWIFT: &str = r#"struct WebView: UIViewRepresentable {
    let url: URL

    func makeUIView(context: Context) -> WKWebView {
        WKWebView()
    }

    func updateUIView(_ view: WKWebView, context: Context) {
        view.load(URLRequest(url: url))
    }
}
"#;

const KEY: &str = "2022/05/03/wrapping-uikit-views-in-swiftui/";

fn example_post() -> String {
    format!(
        "---\ntitle: Wrapping UIKit views in SwiftUI\ndate: 2022-05-03\ncategories: [Swift]\ntags: [SwiftUI, UIKit]\n---\n\
SwiftUI does not ship a web view, so we wrap `WKWebView`.\n\n<!-- more -->\n\n\
```swift\n{}```\n\n\
![The web view in the simulator](/images/simulator.png)\n\n\
![Coordinator flow](/images/coordinator.png \"Flow\")\n",
        SWIFT
    )
}

fn setup() -> (TempDir, Site) {
    let tmp = TempDir::new().unwrap();
    let posts = tmp.path().join("source/_posts");
    let images = tmp.path().join("source/images");
    fs::create_dir_all(&posts).unwrap();
    fs::create_dir_all(&images).unwrap();
    fs::write(posts.join("uikit-in-swiftui.md"), example_post()).unwrap();
    fs::write(images.join("simulator.png"), b"\x89PNG fake").unwrap();
    let site = Site::with_config(tmp.path(), SiteConfig::default());
    (tmp, site)
}

fn code_text(html: &str) -> String {
    let start = html.find("<code class=").unwrap();
    let start = start + html[start..].find('>').unwrap() + 1;
    let end = start + html[start..].find("</code>").unwrap();
    html_unescape(&strip_html(&html[start..end]))
}

#[test]
fn publishes_example_post() {
    let (_tmp, site) = setup();
    let mut pipeline = Pipeline::new(&site).unwrap();
    let report = pipeline.process("uikit-in-swiftui").unwrap();
    pipeline.finish().unwrap();

    assert_eq!(report.key, KEY);
    assert_eq!(report.outcome, PublishOutcome::Created);
    assert_eq!(report.code_blocks, 1);
    assert_eq!(report.media, 2);
    assert_eq!(report.unresolved, 1);

    let html = fs::read_to_string(site.public_dir.join(KEY).join(PAGE_FILE)).unwrap();
    assert_eq!(html.matches(r#"class="language-swift""#).count(), 1);
    assert!(html.contains(r#"<img src="/images/simulator.png""#));
    assert!(html.contains(r#"class="media-placeholder""#));
    assert!(html.contains(r#"data-src="/images/coordinator.png""#));
    assert!(site.public_dir.join("images/simulator.png").is_file());
}

#[test]
fn metadata_round_trips() {
    let (_tmp, site) = setup();
    let mut pipeline = Pipeline::new(&site).unwrap();
    let report = pipeline.process("uikit-in-swiftui").unwrap();
    pipeline.finish().unwrap();

    let publisher = Publisher::open(&site);
    let meta = publisher.read_meta(KEY).unwrap();
    assert_eq!(meta, report.meta);
    assert_eq!(meta.title, "Wrapping UIKit views in SwiftUI");
    assert_eq!(meta.date.to_rfc3339(), "2022-05-03T00:00:00+00:00");
    assert_eq!(meta.categories.iter().collect::<Vec<_>>(), ["Swift"]);
    assert_eq!(meta.tags.iter().collect::<Vec<_>>(), ["SwiftUI", "UIKit"]);
}

#[test]
fn code_literal_is_preserved() {
    let (_tmp, site) = setup();
    let mut pipeline = Pipeline::new(&site).unwrap();
    pipeline.process("uikit-in-swiftui").unwrap();

    let html = fs::read_to_string(site.public_dir.join(KEY).join(PAGE_FILE)).unwrap();
    let article = &html[html.find("post-content").unwrap()..];
    assert_eq!(code_text(article), SWIFT);
}

#[test]
fn republishing_is_idempotent() {
    let (_tmp, site) = setup();

    let first = site.generate().unwrap();
    assert!(first.is_success());
    let page = site.public_dir.join(KEY).join(PAGE_FILE);
    let before = fs::read(&page).unwrap();

    let second = site.generate().unwrap();
    assert_eq!(second.count(PublishOutcome::Unchanged), 1);
    assert_eq!(second.index, Some(PublishOutcome::Unchanged));
    assert_eq!(fs::read(&page).unwrap(), before);
}

#[test]
fn renamed_post_moves_output() {
    let (_tmp, site) = setup();
    site.generate().unwrap();

    let source = site.posts_dir().join("uikit-in-swiftui.md");
    let renamed = fs::read_to_string(&source)
        .unwrap()
        .replace("title: Wrapping UIKit views in SwiftUI", "title: WKWebView in SwiftUI");
    fs::write(&source, renamed).unwrap();

    let summary = site.generate().unwrap();
    assert_eq!(summary.published[0].key, "2022/05/03/wkwebview-in-swiftui/");
    assert!(!site.public_dir.join(KEY).exists());
    assert!(site.public_dir.join("2022/05/03/wkwebview-in-swiftui").join(PAGE_FILE).is_file());
}

#[test]
fn deleted_post_is_pruned() {
    let (_tmp, site) = setup();
    site.generate().unwrap();
    fs::remove_file(site.posts_dir().join("uikit-in-swiftui.md")).unwrap();

    let summary = site.generate().unwrap();
    assert_eq!(summary.pruned, vec!["uikit-in-swiftui".to_string()]);
    assert!(!site.public_dir.join(KEY).exists());
}

#[test]
fn broken_post_does_not_stop_the_run() {
    let (_tmp, site) = setup();
    fs::write(
        site.posts_dir().join("broken.md"),
        "---\ntitle: Broken\ndate: 2022-06-01\n---\n```swift\nlet a = 1\n",
    )
    .unwrap();

    let summary = site.generate().unwrap();
    assert_eq!(summary.published.len(), 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].0, "broken");
    assert!(matches!(
        summary.failures[0].1,
        PipelineError::Render(RenderError::UnterminatedFence { line: 1, .. })
    ));
    assert!(site.render_one("broken").is_err());
}

#[test]
fn media_outside_source_is_a_placeholder() {
    let (tmp, site) = setup();
    fs::write(tmp.path().join("secret.png"), b"\x89PNG fake").unwrap();
    fs::write(
        site.posts_dir().join("escape.md"),
        "---\ntitle: Escape\ndate: 2022-06-01\n---\n![Secret](/../secret.png)\n",
    )
    .unwrap();

    let mut pipeline = Pipeline::new(&site).unwrap();
    let report = pipeline.process("escape").unwrap();
    pipeline.finish().unwrap();

    assert_eq!(report.unresolved, 1);
    let html = fs::read_to_string(site.public_dir.join(&report.key).join(PAGE_FILE)).unwrap();
    assert!(html.contains(r#"data-src="/../secret.png""#));
    assert!(!html.contains(r#"<img src="/../secret.png""#));
    assert!(!tmp.path().join("public/secret.png").exists());
}
