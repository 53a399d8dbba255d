#![allow(dead_code)]

use lifeline::assert_completes;
use log::LevelFilter;
use std::sync::{Arc, Once};
use tab_sidebar::{
    config::SidebarConfig, init_logging, message::sidebar::SidebarOptions, state::view::SidebarView,
    SidebarSession,
};
use tab_sidebar_api::{
    memory::MemoryBrowser,
    tab::{TabId, TabRecord, WindowId},
};

pub const WINDOW: WindowId = WindowId(1);

static INIT: Once = Once::new();

/// Setup function that is only run once, even if called multiple times.
pub fn setup() {
    INIT.call_once(|| {
        let config = SidebarConfig {
            log_level: LevelFilter::Info,
            ..SidebarConfig::default()
        };

        init_logging(&config).expect("failed to install the test logger");
    });
}

pub fn tab(id: u32, title: &str) -> TabRecord {
    TabRecord::builder()
        .id(TabId(id))
        .window_id(WINDOW)
        .title(title)
        .url(format!("http://example.com/{}", id))
        .build()
}

pub fn ids(values: &[u32]) -> Vec<TabId> {
    values.iter().copied().map(TabId).collect()
}

/// A browser with a single window of untitled tabs
pub fn browser(values: &[u32]) -> Arc<MemoryBrowser> {
    let tabs = values
        .iter()
        .map(|id| tab(*id, &format!("tab {}", id)))
        .collect();

    titled_browser(tabs)
}

pub fn titled_browser(tabs: Vec<TabRecord>) -> Arc<MemoryBrowser> {
    Arc::new(MemoryBrowser::with_window(WINDOW, tabs))
}

/// Mounts a sidebar on `WINDOW`, and waits for the registry to load
pub async fn mount(browser: &Arc<MemoryBrowser>) -> anyhow::Result<SidebarSession> {
    mount_with(browser, SidebarConfig::default()).await
}

pub async fn mount_with(
    browser: &Arc<MemoryBrowser>,
    config: SidebarConfig,
) -> anyhow::Result<SidebarSession> {
    setup();

    let options = SidebarOptions::builder()
        .window_id(WINDOW)
        .config(config)
        .build();

    let mut session = SidebarSession::mount(browser.clone(), options)?;
    assert_completes!(session.view(), 1000)?;

    Ok(session)
}

/// Waits for a view that satisfies the condition
pub async fn await_view(
    session: &mut SidebarSession,
    condition: impl FnMut(&SidebarView) -> bool,
) -> anyhow::Result<SidebarView> {
    let view = assert_completes!(session.view_where(condition), 1000)?;
    Ok(view)
}

pub async fn select(session: &mut SidebarSession, values: &[u32]) -> anyhow::Result<()> {
    for id in values {
        session.toggle_selection(TabId(*id), true).await?;
    }

    let count = values.len();
    await_view(session, |view| view.selected_count == count).await?;

    Ok(())
}
