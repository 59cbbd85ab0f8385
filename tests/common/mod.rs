#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::{redirect::Policy, Client, Response};

use forms_ajaxified::app::app;
use forms_ajaxified::contacts::{Contact, ContactInput, ContactStore};

pub struct TestServer {
    pub base_url: String,
    pub store: ContactStore,
    client: Client,
}

impl TestServer {
    /// Serve a fresh application on an ephemeral port for the current test
    pub async fn spawn() -> Result<Self> {
        let store = ContactStore::new();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind ephemeral port")?;
        let addr = listener.local_addr()?;

        let router = app(store.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                eprintln!("test server stopped: {}", e);
            }
        });

        // Redirects are part of what the tests check, so never follow them
        let client = Client::builder()
            .redirect(Policy::none())
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            base_url: format!("http://{}", addr),
            store,
            client,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn contact(&self, name: &str) -> Contact {
        self.store
            .create(ContactInput {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                phone: None,
            })
            .await
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Form-encoded POST as a browser would send it
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<Response> {
        Ok(self.client.post(self.url(path)).form(form).send().await?)
    }

    /// Form-encoded POST flagged as XMLHttpRequest
    pub async fn ajax_post(&self, path: &str, form: &[(&str, &str)]) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .header("X-Requested-With", "XMLHttpRequest")
            .form(form)
            .send()
            .await?)
    }
}
