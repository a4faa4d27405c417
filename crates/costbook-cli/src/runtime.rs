// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use costbook_app::{CostingController, ProductLookup, SupplierLookup};
use costbook_testkit::DemoCatalog;
use costbook_tui::{InternalEvent, LookupRuntime};
use std::sync::mpsc::Sender;
use std::thread;
use tracing::trace;

/// Runs each lookup on its own thread against the costing server.
pub struct HttpRuntime {
    client: costbook_api::Client,
}

impl HttpRuntime {
    pub fn new(client: costbook_api::Client) -> Self {
        Self { client }
    }
}

impl LookupRuntime for HttpRuntime {
    fn spawn_supplier_lookup(
        &mut self,
        lookup: SupplierLookup,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name("supplier-search".to_owned())
            .spawn(move || {
                let result = client
                    .search_suppliers(&lookup.query)
                    .map_err(|error| format!("{error:#}"));
                let _ = tx.send(InternalEvent::SuppliersLoaded {
                    request_id: lookup.request_id,
                    result,
                });
            })
            .context("spawn supplier search thread")?;
        Ok(())
    }

    fn spawn_product_lookup(
        &mut self,
        lookup: ProductLookup,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name("product-search".to_owned())
            .spawn(move || {
                let result = client
                    .search_products(&lookup.query)
                    .map_err(|error| format!("{error:#}"));
                let _ = tx.send(InternalEvent::ProductsLoaded {
                    request_id: lookup.request_id,
                    result,
                });
            })
            .context("spawn product search thread")?;
        Ok(())
    }
}

/// Answers lookups from an in-memory catalog for `--demo`.
pub struct DemoRuntime {
    catalog: DemoCatalog,
}

impl DemoRuntime {
    pub fn new(catalog: DemoCatalog) -> Self {
        Self { catalog }
    }
}

impl LookupRuntime for DemoRuntime {
    fn spawn_supplier_lookup(
        &mut self,
        lookup: SupplierLookup,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        tx.send(InternalEvent::SuppliersLoaded {
            request_id: lookup.request_id,
            result: Ok(self.catalog.search_suppliers(&lookup.query)),
        })
        .context("deliver demo supplier results")
    }

    fn spawn_product_lookup(
        &mut self,
        lookup: ProductLookup,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        tx.send(InternalEvent::ProductsLoaded {
            request_id: lookup.request_id,
            result: Ok(self.catalog.search_products(&lookup.query)),
        })
        .context("deliver demo product results")
    }
}

pub fn trace_controller_events(controller: &mut CostingController) {
    controller.subscribe(|event| trace!(?event, "controller event"));
}

#[cfg(test)]
mod tests {
    use super::{DemoRuntime, HttpRuntime};
    use anyhow::{Result, anyhow};
    use costbook_app::{ProductLookup, RequestId, SupplierLookup};
    use costbook_testkit::{DemoCatalog, product};
    use costbook_tui::{InternalEvent, LookupRuntime};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use tiny_http::{Header, Response, Server};

    fn demo_catalog() -> DemoCatalog {
        DemoCatalog::from_parts(
            vec!["Acme Foods".to_owned(), "Harbor Dairy".to_owned()],
            vec![
                product("Acme Foods", "Plain Flour", "kg", "1.20"),
                product("Harbor Dairy", "Whole Milk", "l", "0.95"),
            ],
        )
    }

    #[test]
    fn demo_runtime_answers_supplier_lookup() -> Result<()> {
        let mut runtime = DemoRuntime::new(demo_catalog());
        let (tx, rx) = mpsc::channel();
        runtime.spawn_supplier_lookup(
            SupplierLookup {
                request_id: RequestId::new(4),
                query: "harbor".to_owned(),
            },
            tx,
        )?;

        assert_eq!(
            rx.recv_timeout(Duration::from_secs(1))?,
            InternalEvent::SuppliersLoaded {
                request_id: RequestId::new(4),
                result: Ok(vec!["Harbor Dairy".to_owned()]),
            }
        );
        Ok(())
    }

    #[test]
    fn demo_runtime_answers_product_lookup() -> Result<()> {
        let mut runtime = DemoRuntime::new(demo_catalog());
        let (tx, rx) = mpsc::channel();
        runtime.spawn_product_lookup(
            ProductLookup {
                request_id: RequestId::new(2),
                query: "flour".to_owned(),
            },
            tx,
        )?;

        let InternalEvent::ProductsLoaded { request_id, result } =
            rx.recv_timeout(Duration::from_secs(1))?
        else {
            return Err(anyhow!("expected product results"));
        };
        assert_eq!(request_id, RequestId::new(2));
        let records = result.map_err(|message| anyhow!(message))?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].supplier, "Acme Foods");
        Ok(())
    }

    #[test]
    fn http_runtime_delivers_results_over_channel() -> Result<()> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}", server.server_addr());
        let handle = thread::spawn(move || {
            let request = server.recv().expect("request expected");
            assert_eq!(request.url(), "/api/suppliers/search?query=acme");
            request
                .respond(
                    Response::from_string(r#"["Acme Foods"]"#).with_header(
                        Header::from_bytes("Content-Type", "application/json")
                            .expect("valid content type header"),
                    ),
                )
                .expect("response should succeed");
        });

        let client = costbook_api::Client::new(&addr, Duration::from_secs(2))?;
        let mut runtime = HttpRuntime::new(client);
        let (tx, rx) = mpsc::channel();
        runtime.spawn_supplier_lookup(
            SupplierLookup {
                request_id: RequestId::new(9),
                query: "acme".to_owned(),
            },
            tx,
        )?;

        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5))?,
            InternalEvent::SuppliersLoaded {
                request_id: RequestId::new(9),
                result: Ok(vec!["Acme Foods".to_owned()]),
            }
        );
        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn http_runtime_reports_failures_as_text() -> Result<()> {
        let client = costbook_api::Client::new("http://127.0.0.1:1", Duration::from_millis(50))?;
        let mut runtime = HttpRuntime::new(client);
        let (tx, rx) = mpsc::channel();
        runtime.spawn_product_lookup(
            ProductLookup {
                request_id: RequestId::new(1),
                query: "butter".to_owned(),
            },
            tx,
        )?;

        let InternalEvent::ProductsLoaded { result, .. } = rx.recv_timeout(Duration::from_secs(5))?
        else {
            return Err(anyhow!("expected product completion"));
        };
        let message = result.expect_err("unreachable server should fail");
        assert!(
            message.contains("[api].base_url") || message.contains("timed out"),
            "unexpected message: {message}"
        );
        Ok(())
    }
}
