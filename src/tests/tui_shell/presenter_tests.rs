use super::*;
use crate::model::{ModalButtonSpec, ModalSpec, NavPageSpec, PageSpec, PlainPageSpec};
use crate::navigation::Navigator;

fn form(title: &str) -> (PageKey, PageSpec) {
    let spec = NavPageSpec::new(
        title,
        WidgetSpec::Column {
            widgets: vec![
                WidgetSpec::Text {
                    text: "Terms".to_string(),
                },
                WidgetSpec::Empty,
                WidgetSpec::Checkbox {
                    var_name: "agree".to_string(),
                    text: Some("I agree".to_string()),
                    initial_bool: false,
                    actions: Vec::new(),
                },
                WidgetSpec::Button {
                    text: "Submit".to_string(),
                    actions: vec![ActionSpec::Rpc("/submit".to_string())],
                },
            ],
        },
    );
    (PageKey::new("/form"), spec.into())
}

fn screen_and_navigator() -> (SharedScreen, Navigator<TerminalPresenter>) {
    let screen = SharedScreen::default();
    let navigator = Navigator::new(TerminalPresenter::new(Arc::clone(&screen)));
    (screen, navigator)
}

#[tokio::test]
async fn stack_is_flattened_into_rows() {
    let (screen, navigator) = screen_and_navigator();
    navigator.update(vec![form("Form")]).await.unwrap();

    let screen = lock_screen(&screen).clone();
    let page = screen.top().unwrap();
    assert_eq!(page.title.as_deref(), Some("Form"));
    assert_eq!(page.back, Some(BackControl::Hidden));
    let labels: Vec<String> = page.rows.iter().map(Row::label).collect();
    assert_eq!(labels, vec!["Terms", "[ ] I agree", "[ Submit ]"]);
    assert_eq!(
        page.rows[2].actions,
        vec![ActionSpec::Rpc("/submit".to_string())]
    );
    assert_eq!(screen.generation, 1);
}

#[tokio::test]
async fn checkbox_state_survives_page_update() {
    let (screen, navigator) = screen_and_navigator();
    navigator.update(vec![form("Form")]).await.unwrap();

    let row = lock_screen(&screen).top().unwrap().rows[1].clone();
    assert_eq!(row.toggle(), Some(true));

    navigator.update(vec![form("Form v2")]).await.unwrap();
    let screen = lock_screen(&screen).clone();
    let page = screen.top().unwrap();
    assert_eq!(page.title.as_deref(), Some("Form v2"));
    assert_eq!(page.rows[1].is_checked(), Some(true));
}

#[tokio::test]
async fn nav_end_widget_becomes_header_row() {
    let (screen, navigator) = screen_and_navigator();
    let mut spec = NavPageSpec::new("Inbox", WidgetSpec::Empty);
    spec.end = Some(WidgetSpec::Button {
        text: "New".to_string(),
        actions: vec![ActionSpec::Push(PageKey::new("/new"))],
    });
    let home = PlainPageSpec::new(None, WidgetSpec::Empty);
    navigator
        .update(vec![
            (PageKey::new("/"), home.into()),
            (PageKey::new("/inbox"), spec.into()),
        ])
        .await
        .unwrap();

    let screen = lock_screen(&screen).clone();
    assert_eq!(screen.pages.len(), 2);
    assert_eq!(screen.pages[0].back, None);
    let top = screen.top().unwrap();
    assert_eq!(top.back, Some(BackControl::Enabled));
    assert!(top.rows.is_empty());
    assert_eq!(top.end.as_ref().map(|r| r.text.as_str()), Some("[ New ]"));
}

#[tokio::test]
async fn overlays_follow_working_and_modals() {
    let (screen, navigator) = screen_and_navigator();
    let alert = ModalSpec::new(
        ModalKind::Alert,
        "Delete?",
        Some("Gone for good".to_string()),
        vec![ModalButtonSpec::new("OK", vec![ActionSpec::Pop])],
    );
    navigator
        .update(vec![form("Form"), (PageKey::new("/confirm"), alert.into())])
        .await
        .unwrap();
    let expected = OverlayView::Modal {
        key: PageKey::new("/confirm"),
        kind: ModalKind::Alert,
        title: "Delete?".to_string(),
        text: Some("Gone for good".to_string()),
        buttons: vec![("OK".to_string(), vec![ActionSpec::Pop])],
    };
    assert_eq!(lock_screen(&screen).overlay, Some(expected.clone()));

    navigator.set_working(Some("Saving".to_string())).await;
    assert_eq!(
        lock_screen(&screen).overlay,
        Some(OverlayView::Working("Saving".to_string()))
    );

    navigator.set_working(None).await;
    assert_eq!(lock_screen(&screen).overlay, Some(expected));
}
