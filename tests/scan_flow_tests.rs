// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the scan, dispatch and close flow

use barcodetoweb::app::PageState;
use barcodetoweb::browser::PageContent;
use barcodetoweb::storage::{self, MemoryConfigStore};
use barcodetoweb::{AppModel, Effect, Message, Screen};
use std::time::{Duration, Instant};
use url::Url;

const CONFIG: &str = r#"{"t":"_bc2w-conf","a":[
    {"n":"Tickets","u":"https://tickets.example/check?event=7","p":"ticket","r":"^T-\\d{6}$"}
]}"#;

fn scan(model: &mut AppModel, data: &str, at: Instant) -> Vec<Effect> {
    model.update(Message::Scanned {
        data: data.to_string(),
        at,
    })
}

#[test]
fn test_full_session() {
    let t0 = Instant::now();
    let store = MemoryConfigStore::new();

    // Fresh install: no stored configuration
    let mut model = AppModel::with_configuration(storage::load_configuration(&store));
    assert_eq!(model.screen(), Screen::RequestingPermission);
    model.update(Message::PermissionResolved { granted: true });
    assert!(model.selector_options().is_empty());

    // Configuration code
    for effect in scan(&mut model, CONFIG, t0) {
        if let Effect::PersistConfig(config) = effect {
            let result = storage::save_configuration(&store, &config);
            model.update(Message::ConfigSaved(result));
        }
    }
    assert_eq!(model.selector_options().len(), 1);
    assert!(storage::load_configuration(&store).is_some());

    // Ticket, keeping the base URL's own query
    let effects = scan(&mut model, "T-123456", t0 + Duration::from_secs(6));
    let url = Url::parse("https://tickets.example/check?event=7&ticket=T-123456").expect("url");
    assert_eq!(effects.last(), Some(&Effect::LoadPage(url.clone())));
    assert_eq!(model.screen(), Screen::EmbeddedView);

    // Page loads, then the page navigates to the close marker
    let content = PageContent {
        final_url: url.clone(),
        status: 200,
        title: Some("Valid".to_string()),
        text: "Ticket valid".to_string(),
    };
    model.update(Message::PageLoaded {
        url: url.clone(),
        result: Ok(content.clone()),
    });
    assert_eq!(
        model.embedded().map(|e| e.page.clone()),
        Some(PageState::Loaded(content))
    );

    let close = Url::parse("https://tickets.example/done?barcodetoweb_close_cmd=1").expect("url");
    model.update(Message::BrowserNavigated {
        view: url.clone(),
        url: close,
    });
    assert_eq!(model.screen(), Screen::Scanner);

    // Back from the scanner exits
    assert_eq!(model.update(Message::Back), vec![Effect::Exit]);
}

#[test]
fn test_restart_uses_stored_configuration() {
    let store = MemoryConfigStore::with_slot("config", CONFIG);
    let mut model = AppModel::with_configuration(storage::load_configuration(&store));
    model.update(Message::PermissionResolved { granted: true });

    let effects = scan(&mut model, "T-000001", Instant::now());
    assert!(matches!(effects.last(), Some(Effect::LoadPage(_))));
}

#[test]
fn test_denied_camera_never_scans() {
    let store = MemoryConfigStore::with_slot("config", CONFIG);
    let mut model = AppModel::with_configuration(storage::load_configuration(&store));
    model.update(Message::PermissionResolved { granted: false });
    assert_eq!(model.screen(), Screen::NoCameraAccess);

    // A late grant does not reopen the camera
    model.update(Message::PermissionResolved { granted: true });
    assert_eq!(model.screen(), Screen::NoCameraAccess);
}

#[test]
fn test_stale_page_result_is_ignored() {
    let t0 = Instant::now();
    let store = MemoryConfigStore::with_slot("config", CONFIG);
    let mut model = AppModel::with_configuration(storage::load_configuration(&store));
    model.update(Message::PermissionResolved { granted: true });

    scan(&mut model, "T-111111", t0);
    model.update(Message::Back);
    scan(&mut model, "T-222222", t0 + Duration::from_secs(5));

    let first = Url::parse("https://tickets.example/check?event=7&ticket=T-111111").expect("url");
    model.update(Message::PageLoaded {
        url: first,
        result: Err("timeout".to_string()),
    });
    assert_eq!(
        model.embedded().map(|e| e.page.clone()),
        Some(PageState::Loading)
    );
    assert_eq!(
        model.embedded().map(|e| e.payload.as_str()),
        Some("T-222222")
    );
}
