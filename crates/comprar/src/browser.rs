//! Chromium control over the DevTools Protocol.
//!
//! Compiled with the `browser` feature this module provides [`CdpDriver`],
//! the real [`Driver`](crate::Driver) implementation via chromiumoxide.
//! Element handles are made stable within a page snapshot by tagging each
//! queried element with a `data-comprar-id` attribute.

use crate::config::SuiteConfig;

/// Browser launch configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// User agent string
    pub user_agent: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            user_agent: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Set user agent
    #[must_use]
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

impl From<&SuiteConfig> for BrowserConfig {
    fn from(config: &SuiteConfig) -> Self {
        Self::default().with_headless(config.headless)
    }
}

#[cfg(feature = "browser")]
mod cdp {
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::network::{
        CookieParam, CookieSameSite, GetCookiesParams, SetCookiesParams,
    };
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::Deserialize;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tokio::sync::Mutex;

    use super::BrowserConfig;
    use crate::driver::{BoundingBox, Driver, ElementHandle};
    use crate::locator::Strategy;
    use crate::result::{ComprarError, ComprarResult};
    use crate::session::{Cookie, SameSite, StorageState};
    use crate::wait::{LoadState, WaitOptions};

    /// Element record returned by the in-page collection script
    #[derive(Debug, Deserialize)]
    struct RawElement {
        id: String,
        tag: String,
        text: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        visible: bool,
    }

    /// Wrap a strategy's query expression in the tagging collector.
    fn collect_script(expr: &str) -> String {
        format!(
            "(() => {{ const els = {expr}; \
             let next = window.__comprar_next_id || 1; \
             const out = els.map(el => {{ \
               if (!el.dataset.comprarId) {{ el.dataset.comprarId = String(next++); }} \
               const r = el.getBoundingClientRect(); \
               return {{ id: el.dataset.comprarId, tag: el.tagName.toLowerCase(), \
                         text: (el.textContent || '').trim(), \
                         x: r.x, y: r.y, width: r.width, height: r.height, \
                         visible: r.width > 0 && r.height > 0 }}; \
             }}); \
             window.__comprar_next_id = next; \
             return out; }})()"
        )
    }

    fn handle_selector(element: &ElementHandle) -> String {
        format!("[data-comprar-id=\"{}\"]", element.id)
    }

    fn browser_err(err: impl std::fmt::Display) -> ComprarError {
        ComprarError::Browser {
            message: err.to_string(),
        }
    }

    /// Real driver over a chromiumoxide browser and page.
    pub struct CdpDriver {
        config: BrowserConfig,
        browser: Arc<Mutex<CdpBrowser>>,
        page: Arc<Mutex<CdpPage>>,
        #[allow(dead_code)]
        handle: tokio::task::JoinHandle<()>,
    }

    impl std::fmt::Debug for CdpDriver {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("CdpDriver")
                .field("config", &self.config)
                .finish_non_exhaustive()
        }
    }

    impl CdpDriver {
        /// Launch a browser and open a blank page.
        ///
        /// # Errors
        ///
        /// Returns `Browser` errors when the executable is missing or the
        /// CDP connection cannot be established.
        pub async fn launch(config: BrowserConfig) -> ComprarResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder.build().map_err(browser_err)?;

            let (browser, mut handler) =
                CdpBrowser::launch(cdp_config).await.map_err(browser_err)?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = browser.new_page("about:blank").await.map_err(browser_err)?;

            if let Some(ref ua) = config.user_agent {
                page.set_user_agent(ua).await.map_err(browser_err)?;
            }

            Ok(Self {
                config,
                browser: Arc::new(Mutex::new(browser)),
                page: Arc::new(Mutex::new(page)),
                handle,
            })
        }

        /// Launch configuration in use
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        async fn eval<T: serde::de::DeserializeOwned>(&self, script: &str) -> ComprarResult<T> {
            let page = self.page.lock().await;
            let result = page.evaluate(script).await.map_err(browser_err)?;
            result.into_value().map_err(browser_err)
        }
    }

    #[async_trait]
    impl Driver for CdpDriver {
        async fn navigate(&self, url: &str) -> ComprarResult<()> {
            let page = self.page.lock().await;
            page.goto(url).await.map_err(|err| ComprarError::Navigation {
                url: url.to_string(),
                message: err.to_string(),
            })?;
            Ok(())
        }

        async fn current_url(&self) -> ComprarResult<String> {
            let page = self.page.lock().await;
            let url = page.url().await.map_err(browser_err)?;
            Ok(url.unwrap_or_else(|| "about:blank".to_string()))
        }

        async fn find_all(&self, strategy: &Strategy) -> ComprarResult<Vec<ElementHandle>> {
            let script = collect_script(&strategy.to_query_all());
            let raw: Vec<RawElement> = self.eval(&script).await?;
            Ok(raw
                .into_iter()
                .map(|el| {
                    let mut handle = ElementHandle::new(el.id, el.tag).with_text(el.text);
                    if el.visible {
                        handle = handle
                            .with_bounding_box(BoundingBox::new(el.x, el.y, el.width, el.height));
                    }
                    handle
                })
                .collect())
        }

        async fn click(&self, element: &ElementHandle) -> ComprarResult<()> {
            let selector = handle_selector(element);
            let page = self.page.lock().await;
            let el = page.find_element(&selector).await.map_err(browser_err)?;
            el.click().await.map_err(browser_err)?;
            Ok(())
        }

        async fn fill(&self, element: &ElementHandle, text: &str) -> ComprarResult<()> {
            let selector = handle_selector(element);
            let page = self.page.lock().await;
            page.evaluate(format!(
                "(() => {{ const el = document.querySelector('{selector}'); \
                 if (el) {{ el.value = ''; }} }})()"
            ))
            .await
            .map_err(browser_err)?;
            let el = page.find_element(&selector).await.map_err(browser_err)?;
            el.click().await.map_err(browser_err)?;
            el.type_str(text).await.map_err(browser_err)?;
            Ok(())
        }

        async fn scroll_into_view(&self, element: &ElementHandle) -> ComprarResult<()> {
            let selector = handle_selector(element);
            let page = self.page.lock().await;
            let el = page.find_element(&selector).await.map_err(browser_err)?;
            el.scroll_into_view().await.map_err(browser_err)?;
            Ok(())
        }

        async fn is_visible(&self, element: &ElementHandle) -> ComprarResult<bool> {
            let selector = handle_selector(element);
            self.eval(&format!(
                "(() => {{ const el = document.querySelector('{selector}'); \
                 if (!el) return false; \
                 const r = el.getBoundingClientRect(); \
                 const s = getComputedStyle(el); \
                 return r.width > 0 && r.height > 0 && \
                        s.visibility !== 'hidden' && s.display !== 'none'; }})()"
            ))
            .await
        }

        async fn wait_for_load_state(
            &self,
            state: LoadState,
            options: &WaitOptions,
        ) -> ComprarResult<()> {
            let start = Instant::now();
            let mut last_resource_count: Option<u64> = None;
            let mut quiet_since = Instant::now();

            loop {
                let ready: String = self.eval("document.readyState").await?;
                let reached = match state {
                    LoadState::DomContentLoaded => ready == "interactive" || ready == "complete",
                    LoadState::Load => ready == "complete",
                    LoadState::NetworkIdle => {
                        if ready == "complete" {
                            let count: u64 = self
                                .eval("performance.getEntriesByType('resource').length")
                                .await?;
                            if last_resource_count != Some(count) {
                                last_resource_count = Some(count);
                                quiet_since = Instant::now();
                            }
                            quiet_since.elapsed() >= Duration::from_millis(500)
                        } else {
                            false
                        }
                    }
                };
                if reached {
                    return Ok(());
                }
                if start.elapsed() >= options.timeout() {
                    return Err(ComprarError::Timeout {
                        ms: options.timeout_ms,
                        waiting_for: format!("load state: {state}"),
                    });
                }
                tokio::time::sleep(options.poll_interval()).await;
            }
        }

        async fn storage_state(&self) -> ComprarResult<StorageState> {
            let cookies = {
                let page = self.page.lock().await;
                page.execute(GetCookiesParams::default())
                    .await
                    .map_err(browser_err)?
                    .result
                    .cookies
            };

            let mut state = StorageState::new();
            for cookie in cookies {
                state.cookies.push(Cookie {
                    name: cookie.name,
                    value: cookie.value,
                    domain: cookie.domain,
                    path: cookie.path,
                    expires: (cookie.expires >= 0.0).then_some(cookie.expires as i64),
                    http_only: cookie.http_only,
                    secure: cookie.secure,
                    same_site: match cookie.same_site {
                        Some(CookieSameSite::Strict) => SameSite::Strict,
                        Some(CookieSameSite::None) => SameSite::None,
                        _ => SameSite::Lax,
                    },
                });
            }

            let origin: String = self.eval("location.origin").await?;
            let local: std::collections::HashMap<String, String> = self
                .eval(
                    "(() => { const out = {}; \
                     for (let i = 0; i < localStorage.length; i++) { \
                       const k = localStorage.key(i); out[k] = localStorage.getItem(k); } \
                     return out; })()",
                )
                .await?;
            if !local.is_empty() {
                state.local_storage.insert(origin.clone(), local);
            }
            let session: std::collections::HashMap<String, String> = self
                .eval(
                    "(() => { const out = {}; \
                     for (let i = 0; i < sessionStorage.length; i++) { \
                       const k = sessionStorage.key(i); out[k] = sessionStorage.getItem(k); } \
                     return out; })()",
                )
                .await?;
            if !session.is_empty() {
                state.session_storage.insert(origin, session);
            }

            Ok(state)
        }

        async fn apply_storage_state(&self, state: &StorageState) -> ComprarResult<()> {
            let mut params = Vec::with_capacity(state.cookies.len());
            for cookie in &state.cookies {
                let mut builder = CookieParam::builder()
                    .name(&cookie.name)
                    .value(&cookie.value)
                    .domain(&cookie.domain)
                    .path(&cookie.path)
                    .secure(cookie.secure)
                    .http_only(cookie.http_only)
                    .same_site(match cookie.same_site {
                        SameSite::Strict => CookieSameSite::Strict,
                        SameSite::Lax => CookieSameSite::Lax,
                        SameSite::None => CookieSameSite::None,
                    });
                if let Some(expires) = cookie.expires {
                    builder = builder.expires(expires as f64);
                }
                params.push(builder.build().map_err(browser_err)?);
            }

            if !params.is_empty() {
                let page = self.page.lock().await;
                page.execute(SetCookiesParams::new(params))
                    .await
                    .map_err(browser_err)?;
            }

            // Origin storage can only be written from a page on that
            // origin; entries for other origins are applied once the test
            // navigates there.
            let origin: String = self.eval("location.origin").await?;
            if let Some(items) = state.local_storage.get(&origin) {
                for (key, value) in items {
                    self.eval::<bool>(&format!(
                        "(() => {{ localStorage.setItem({key:?}, {value:?}); return true; }})()"
                    ))
                    .await?;
                }
            }

            Ok(())
        }

        async fn screenshot(&self) -> ComprarResult<Vec<u8>> {
            let page = self.page.lock().await;
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();
            let shot = page
                .execute(params)
                .await
                .map_err(|err| ComprarError::Screenshot {
                    message: err.to_string(),
                })?;

            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(&shot.data)
                .map_err(|err| ComprarError::Screenshot {
                    message: err.to_string(),
                })
        }

        async fn close(&self) -> ComprarResult<()> {
            let mut browser = self.browser.lock().await;
            browser.close().await.map_err(browser_err)?;
            Ok(())
        }
    }

}

#[cfg(feature = "browser")]
pub use cdp::CdpDriver;
