//! Abstract browser automation seam.
//!
//! Page objects and flows are written against the [`Driver`] trait. The
//! default implementation drives Chromium over CDP (the `browser` feature,
//! see [`crate::browser`]); [`MockDriver`] scripts a page graph in memory so
//! every flow is unit-testable without a browser process.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::locator::{ElementSource, Strategy};
use crate::result::{ComprarError, ComprarResult};
use crate::session::StorageState;
use crate::wait::{LoadState, WaitOptions};

/// Handle to a live DOM element.
///
/// Scoped to the page snapshot it was queried from; the page mutates between
/// actions, so handles are re-resolved rather than cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Stable identifier within the current page snapshot
    pub id: String,
    /// Element tag name
    pub tag_name: String,
    /// Trimmed text content
    pub text_content: Option<String>,
    /// Bounding box when the element is rendered
    pub bounding_box: Option<BoundingBox>,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
            text_content: None,
            bounding_box: None,
        }
    }

    /// Set the text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    /// Set the bounding box
    #[must_use]
    pub const fn with_bounding_box(mut self, bbox: BoundingBox) -> Self {
        self.bounding_box = Some(bbox);
        self
    }

    /// Whether the element occupies layout space
    #[must_use]
    pub const fn is_rendered(&self) -> bool {
        self.bounding_box.is_some()
    }
}

/// Bounding box of a rendered element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X position
    pub x: f64,
    /// Y position
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Abstract driver trait over the browser-automation boundary.
///
/// One driver instance owns one page/session context; a test owns its driver
/// exclusively, so no method requires `&mut self` coordination between
/// logical actions.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> ComprarResult<()>;

    /// Current page URL
    async fn current_url(&self) -> ComprarResult<String>;

    /// All elements matching a strategy, in document order
    async fn find_all(&self, strategy: &Strategy) -> ComprarResult<Vec<ElementHandle>>;

    /// Click an element
    async fn click(&self, element: &ElementHandle) -> ComprarResult<()>;

    /// Clear an input and type text into it
    async fn fill(&self, element: &ElementHandle, text: &str) -> ComprarResult<()>;

    /// Scroll an element into the viewport
    async fn scroll_into_view(&self, element: &ElementHandle) -> ComprarResult<()>;

    /// Whether the element is currently visible
    async fn is_visible(&self, element: &ElementHandle) -> ComprarResult<bool>;

    /// Block until the page reaches a load state
    async fn wait_for_load_state(
        &self,
        state: LoadState,
        options: &WaitOptions,
    ) -> ComprarResult<()>;

    /// Export the context's cookies and origin storage
    async fn storage_state(&self) -> ComprarResult<StorageState>;

    /// Apply previously persisted cookies and origin storage
    async fn apply_storage_state(&self, state: &StorageState) -> ComprarResult<()>;

    /// Capture a PNG screenshot of the page
    async fn screenshot(&self) -> ComprarResult<Vec<u8>>;

    /// Tear down the page/session context
    async fn close(&self) -> ComprarResult<()>;
}

#[async_trait]
impl<D: Driver> ElementSource for D {
    async fn find_all(&self, strategy: &Strategy) -> ComprarResult<Vec<ElementHandle>> {
        Driver::find_all(self, strategy).await
    }
}

/// A scripted element on a [`MockPage`].
#[derive(Debug, Clone)]
pub struct MockElement {
    handle: ElementHandle,
    matched_by: Vec<Strategy>,
    visible: bool,
    navigates_to: Option<String>,
}

impl MockElement {
    /// Create a scripted element
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            handle: ElementHandle::new(id, tag_name)
                .with_bounding_box(BoundingBox::new(0.0, 0.0, 100.0, 20.0)),
            matched_by: Vec::new(),
            visible: true,
            navigates_to: None,
        }
    }

    /// Declare a strategy this element matches
    #[must_use]
    pub fn matched_by(mut self, strategy: Strategy) -> Self {
        self.matched_by.push(strategy);
        self
    }

    /// Set the element's text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.handle = self.handle.with_text(text);
        self
    }

    /// Mark the element attached but not visible
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Clicking this element switches the driver to the named page
    #[must_use]
    pub fn navigates_to(mut self, page: impl Into<String>) -> Self {
        self.navigates_to = Some(page.into());
        self
    }
}

/// A scripted page state for [`MockDriver`].
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    name: String,
    url: String,
    elements: Vec<MockElement>,
    storage: StorageState,
}

impl MockPage {
    /// Create a scripted page
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            elements: Vec::new(),
            storage: StorageState::default(),
        }
    }

    /// Add an element to the page
    #[must_use]
    pub fn with_element(mut self, element: MockElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Set the storage state visible while this page is current
    #[must_use]
    pub fn with_storage(mut self, storage: StorageState) -> Self {
        self.storage = storage;
        self
    }
}

#[derive(Debug, Default)]
struct MockState {
    pages: Vec<MockPage>,
    current: usize,
    history: Vec<String>,
    filled: HashMap<String, String>,
    applied_storage: Option<StorageState>,
    screenshot: Vec<u8>,
}

impl MockState {
    fn page(&self) -> ComprarResult<&MockPage> {
        self.pages.get(self.current).ok_or_else(|| ComprarError::Browser {
            message: "mock driver has no pages scripted".to_string(),
        })
    }

    fn element(&self, id: &str) -> ComprarResult<MockElement> {
        self.page()?
            .elements
            .iter()
            .find(|el| el.handle.id == id)
            .cloned()
            .ok_or_else(|| ComprarError::Browser {
                message: format!("stale element handle: {id}"),
            })
    }

    fn goto_page(&mut self, name: &str) -> ComprarResult<()> {
        let index = self
            .pages
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| ComprarError::Navigation {
                url: name.to_string(),
                message: "no scripted page with that name".to_string(),
            })?;
        self.current = index;
        Ok(())
    }
}

/// In-memory driver over a scripted page graph.
///
/// Pages are registered up front; clicking an element with a transition
/// switches the current page, which is how flows are exercised end to end
/// without a browser. Every call is recorded for verification.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create an empty mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scripted page; the first page registered is current.
    #[must_use]
    pub fn with_page(self, page: MockPage) -> Self {
        self.state.lock().expect("mock state").pages.push(page);
        self
    }

    /// Set the scripted screenshot payload
    #[must_use]
    pub fn with_screenshot(self, bytes: Vec<u8>) -> Self {
        self.state.lock().expect("mock state").screenshot = bytes;
        self
    }

    /// Recorded calls, in order
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state.lock().expect("mock state").history.clone()
    }

    /// Whether any recorded call starts with the prefix
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.state
            .lock()
            .expect("mock state")
            .history
            .iter()
            .any(|c| c.starts_with(prefix))
    }

    /// Text last filled into the element, if any
    #[must_use]
    pub fn filled_value(&self, element_id: &str) -> Option<String> {
        self.state
            .lock()
            .expect("mock state")
            .filled
            .get(element_id)
            .cloned()
    }

    /// Storage state applied via [`Driver::apply_storage_state`], if any
    #[must_use]
    pub fn applied_storage(&self) -> Option<StorageState> {
        self.state.lock().expect("mock state").applied_storage.clone()
    }

    /// Name of the current scripted page
    #[must_use]
    pub fn current_page(&self) -> Option<String> {
        let state = self.state.lock().expect("mock state");
        state.pages.get(state.current).map(|p| p.name.clone())
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn navigate(&self, url: &str) -> ComprarResult<()> {
        let mut state = self.state.lock().expect("mock state");
        state.history.push(format!("navigate:{url}"));
        let index = state
            .pages
            .iter()
            .position(|p| p.url == url)
            .ok_or_else(|| ComprarError::Navigation {
                url: url.to_string(),
                message: "no scripted page for URL".to_string(),
            })?;
        state.current = index;
        Ok(())
    }

    async fn current_url(&self) -> ComprarResult<String> {
        let state = self.state.lock().expect("mock state");
        Ok(state.page()?.url.clone())
    }

    async fn find_all(&self, strategy: &Strategy) -> ComprarResult<Vec<ElementHandle>> {
        let state = self.state.lock().expect("mock state");
        Ok(state
            .page()?
            .elements
            .iter()
            .filter(|el| el.matched_by.contains(strategy))
            .map(|el| el.handle.clone())
            .collect())
    }

    async fn click(&self, element: &ElementHandle) -> ComprarResult<()> {
        let mut state = self.state.lock().expect("mock state");
        state.history.push(format!("click:{}", element.id));
        let scripted = state.element(&element.id)?;
        if let Some(target) = scripted.navigates_to {
            state.goto_page(&target)?;
        }
        Ok(())
    }

    async fn fill(&self, element: &ElementHandle, text: &str) -> ComprarResult<()> {
        let mut state = self.state.lock().expect("mock state");
        state.history.push(format!("fill:{}={text}", element.id));
        state.element(&element.id)?;
        state.filled.insert(element.id.clone(), text.to_string());
        Ok(())
    }

    async fn scroll_into_view(&self, element: &ElementHandle) -> ComprarResult<()> {
        let mut state = self.state.lock().expect("mock state");
        state.history.push(format!("scroll:{}", element.id));
        state.element(&element.id)?;
        Ok(())
    }

    async fn is_visible(&self, element: &ElementHandle) -> ComprarResult<bool> {
        let state = self.state.lock().expect("mock state");
        Ok(state
            .page()?
            .elements
            .iter()
            .find(|el| el.handle.id == element.id)
            .is_some_and(|el| el.visible))
    }

    async fn wait_for_load_state(
        &self,
        state: LoadState,
        _options: &WaitOptions,
    ) -> ComprarResult<()> {
        // Scripted pages are always settled.
        let mut guard = self.state.lock().expect("mock state");
        guard.history.push(format!("wait_for_load_state:{state}"));
        Ok(())
    }

    async fn storage_state(&self) -> ComprarResult<StorageState> {
        let state = self.state.lock().expect("mock state");
        Ok(state.page()?.storage.clone())
    }

    async fn apply_storage_state(&self, storage: &StorageState) -> ComprarResult<()> {
        let mut state = self.state.lock().expect("mock state");
        state.history.push("apply_storage_state".to_string());
        state.applied_storage = Some(storage.clone());
        Ok(())
    }

    async fn screenshot(&self) -> ComprarResult<Vec<u8>> {
        let state = self.state.lock().expect("mock state");
        Ok(state.screenshot.clone())
    }

    async fn close(&self) -> ComprarResult<()> {
        let mut state = self.state.lock().expect("mock state");
        state.history.push("close".to_string());
        Ok(())
    }
}
