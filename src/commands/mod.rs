/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `token`     - Acquire an XSUAA token
- `ans`       - Send Alert Notification Service events
- `protecode` - Drive Protecode scans

Handlers build the library clients from the loaded configuration and print
their results to stdout; logs go to stderr.
*/

use crate::config::Config;
use crate::error::Result;
use crate::http::{ClientOptions, HttpClient};

/// Transport with the configured timeout and no credentials.
fn http_client(config: &Config) -> Result<HttpClient> {
    HttpClient::with_options(ClientOptions::default().with_timeout(config.timeout()))
}

// Token command handler
pub mod token {
    use super::*;
    use crate::xsuaa::Xsuaa;

    /// Acquire a token and print a summary
    ///
    /// The access token itself is only printed when `show_token` is set.
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `oauth_url` - OAuth base URL
    /// * `client_id` - OAuth client identifier
    /// * `client_secret` - OAuth client secret
    /// * `show_token` - Whether to print the access token
    pub async fn run_token(
        config: &Config,
        oauth_url: &str,
        client_id: &str,
        client_secret: &str,
        show_token: bool,
    ) -> Result<()> {
        tracing::info!("Requesting token from {}", oauth_url);

        let mut xsuaa = Xsuaa::new(http_client(config)?);
        let token = xsuaa
            .get_bearer_token(oauth_url, client_id, client_secret)
            .await?;

        println!("Token type: {}", token.token_type);
        println!("Expires in: {} seconds", token.expires_in);
        if show_token {
            println!("Access token: {}", token.access_token);
        }
        Ok(())
    }
}

// ANS command handler
pub mod ans {
    use super::*;
    use crate::ans::{Ans, Event};
    use std::path::Path;

    /// Send an event read from `event_path`
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `event_path` - JSON file holding the event
    /// * `service_key_path` - Optional service key file overriding the configuration
    pub async fn send_event(
        config: &Config,
        event_path: &Path,
        service_key_path: Option<&Path>,
    ) -> Result<()> {
        let service_key = config.ans_service_key(service_key_path)?;

        let contents = std::fs::read_to_string(event_path)?;
        let event = Event::from_json(&contents)?;
        tracing::debug!("Loaded ANS event from {}", event_path.display());

        let mut ans = Ans::new(service_key, http_client(config)?);
        let status = ans.send(&event).await?;

        println!("Event sent to {} ({})", ans.events_url(), status);
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_send_event_without_service_key_fails() {
            let dir = tempfile::tempdir().unwrap();
            let event_path = dir.path().join("event.json");
            std::fs::write(&event_path, "{}").unwrap();

            let err = send_event(&Config::default(), &event_path, None)
                .await
                .unwrap_err();
            assert!(err.to_string().contains("no ANS service key configured"));
        }
    }
}

// Protecode command handlers
pub mod protecode {
    use super::*;
    use crate::error::ServiceKitError;
    use crate::protecode::{read_json, ProductList, Protecode, ResultData};
    use std::path::Path;

    fn client(config: &Config) -> Result<Protecode> {
        Protecode::from_options(&config.protecode_options()?)
    }

    fn print_result(data: &ResultData) {
        let result = &data.results;
        println!("Product: {}", result.product_id);
        println!("Status: {:?}", result.status);
        if !result.filename.is_empty() {
            println!("File: {}", result.filename);
        }
        if !result.report_url.is_empty() {
            println!("Report: {}", result.report_url);
        }
    }

    /// List the products of a group
    pub async fn list_products(config: &Config, group: Option<String>) -> Result<()> {
        let group = config.protecode_group(group)?;
        tracing::info!("Loading products of group {}", group);

        let response = client(config)?.load_product(&group).await?;
        let list: ProductList = read_json(response).await?;

        if list.products.is_empty() {
            println!("No products in group {}", group);
            return Ok(());
        }
        for product in &list.products {
            println!("{}\t{}", product.product_id, product.name);
        }
        Ok(())
    }

    /// Show the scan result of a product
    pub async fn show_result(config: &Config, product_id: i64) -> Result<()> {
        let response = client(config)?.load_result(product_id).await?;
        let data: ResultData = read_json(response).await?;
        print_result(&data);
        Ok(())
    }

    /// Download the PDF report of a product to `output`
    pub async fn download_report(config: &Config, product_id: i64, output: &Path) -> Result<()> {
        let report_name = output
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("{}.pdf", product_id));

        let response = client(config)?
            .load_result_as_pdf(product_id, &report_name)
            .await?;
        let bytes = response.bytes().await.map_err(|e| {
            ServiceKitError::BodyRead(format!("error reading PDF report: {}", e))
        })?;

        tokio::fs::write(output, &bytes).await?;
        println!("Wrote {} bytes to {}", bytes.len(), output.display());
        Ok(())
    }

    /// Upload a binary and print the started scan
    pub async fn upload(
        config: &Config,
        file: &Path,
        name: Option<String>,
        group: Option<String>,
        delete_binary: bool,
    ) -> Result<()> {
        let group = config.protecode_group(group)?;
        let file_name = match name {
            Some(name) => name,
            None => file
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .ok_or_else(|| {
                    ServiceKitError::Config(format!(
                        "cannot derive a file name from {}",
                        file.display()
                    ))
                })?,
        };
        let delete_binary = delete_binary || config.protecode.delete_binary;

        tracing::info!("Uploading {} to group {}", file.display(), group);
        let response = client(config)?
            .trigger_with_file_upload(&group, file, &file_name, delete_binary)
            .await?;
        let data: ResultData = read_json(response).await?;
        print_result(&data);
        Ok(())
    }

    /// Trigger a scan of `url` and print the started scan
    pub async fn fetch(
        config: &Config,
        url: &str,
        group: Option<String>,
        delete_binary: bool,
    ) -> Result<()> {
        let group = config.protecode_group(group)?;
        let delete_binary = delete_binary || config.protecode.delete_binary;

        tracing::info!("Triggering scan of {} in group {}", url, group);
        let response = client(config)?
            .trigger_with_fetch_url(&group, url, delete_binary)
            .await?;
        let data: ResultData = read_json(response).await?;
        print_result(&data);
        Ok(())
    }

    /// Delete a product and its scan result
    pub async fn delete(config: &Config, product_id: i64) -> Result<()> {
        client(config)?.delete_result(product_id).await?;
        println!("Deleted product {}", product_id);
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_commands_require_server_url() {
            let err = delete(&Config::default(), 1).await.unwrap_err();
            assert!(err
                .to_string()
                .contains("protecode.server_url is not configured"));
        }

        #[tokio::test]
        async fn test_list_products_requires_group() {
            let mut config = Config::default();
            config.protecode.server_url = Some("http://127.0.0.1:9".to_string());
            config.protecode.username = Some("u".to_string());
            config.protecode.password = Some("p".to_string());

            let err = list_products(&config, None).await.unwrap_err();
            assert!(err.to_string().contains("no Protecode group given"));
        }
    }
}
