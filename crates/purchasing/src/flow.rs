//! The order creation state machine.
//!
//! One run walks the remote transaction from the easy-access menu to the saved
//! order and produces exactly one [`Outcome`]. Stages run strictly in order;
//! the first failing stage ends the run. The session lease is dropped on every
//! path out of [`OrderCreationFlow::run`].

use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use procurebot_core::{FailureReason, OrderNumber, Outcome, RequisitionNumber, SupplierCode};
use procurebot_navigation::{ContainerResolver, FieldWriter, ImageLocator, NavigationClient, ScreenMatcher};

use crate::config::FlowConfig;
use crate::dialogs::ErrorClassifier;
use crate::emit::OutcomeEmitter;
use crate::error::FlowResult;
use crate::lines::{LineMatcher, PriceWriter, RequisitionLineSelector};
use crate::request::OrderRequest;
use crate::screen;
use crate::session::SessionLease;
use crate::supplier::{SupplierAliases, SupplierResolver};
use crate::tax::TaxAssigner;

/// Stages of one run, in execution order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStage {
    AcquireSession,
    OpenTransaction,
    SelectRequisition,
    SelectLines,
    EnterHeader,
    BindLines,
    WritePrices,
    AssignTax,
    Save,
    Commit,
    ReadOrderNumber,
}

/// What one run did, for the caller's records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowReport {
    pub run_id: Uuid,
    pub requisition_number: RequisitionNumber,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Stage that produced the outcome.
    pub last_stage: FlowStage,
    pub outcome: Outcome,
}

pub struct OrderCreationFlow<'a, C, M>
where
    C: NavigationClient + ?Sized,
    M: ScreenMatcher + ?Sized,
{
    client: &'a C,
    screen: &'a M,
    config: &'a FlowConfig,
    aliases: &'a SupplierAliases,
    containers: ContainerResolver,
}

impl<'a, C, M> OrderCreationFlow<'a, C, M>
where
    C: NavigationClient + ?Sized,
    M: ScreenMatcher + ?Sized,
{
    pub fn new(client: &'a C, screen: &'a M, config: &'a FlowConfig, aliases: &'a SupplierAliases) -> Self {
        Self {
            client,
            screen,
            config,
            aliases,
            containers: ContainerResolver::new(config.markers.container.clone()),
        }
    }

    pub fn run(&self, request: &OrderRequest) -> Outcome {
        self.run_with_report(request).outcome
    }

    pub fn run_with_report(&self, request: &OrderRequest) -> FlowReport {
        let run_id = Uuid::now_v7();
        let span = info_span!(
            "order_flow",
            %run_id,
            requisition = %request.requisition_number(),
            lines = request.lines().len()
        );
        let _entered = span.enter();

        let started_at = Utc::now();
        let mut stage = FlowStage::AcquireSession;
        let outcome = match self.execute(request, &mut stage) {
            Ok(order_number) => Outcome::success(order_number),
            Err(e) => {
                let reason = e.into_reason();
                warn!(
                    stage = ?stage,
                    reason = reason.code(),
                    precondition = reason.is_precondition(),
                    detail = %reason,
                    "order flow failed"
                );
                Outcome::failure(reason)
            }
        };
        let finished_at = Utc::now();
        info!(
            stage = ?stage,
            success = outcome.is_success(),
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            "order flow finished"
        );

        FlowReport {
            run_id,
            requisition_number: request.requisition_number().clone(),
            started_at,
            finished_at,
            last_stage: stage,
            outcome,
        }
    }

    fn execute(&self, request: &OrderRequest, stage: &mut FlowStage) -> FlowResult<OrderNumber> {
        let lease = SessionLease::acquire(self.client)?;
        let client = lease.client();
        self.wait(self.config.timing.startup_delay());

        enter(stage, FlowStage::OpenTransaction);
        self.open_transaction(client)?;

        enter(stage, FlowStage::SelectRequisition);
        self.select_requisition(client, request)?;

        enter(stage, FlowStage::SelectLines);
        self.select_lines(client, request)?;

        enter(stage, FlowStage::EnterHeader);
        let supplier = self.enter_header(client, request)?;
        debug!(supplier = %supplier, "header entered");

        enter(stage, FlowStage::BindLines);
        let bindings = LineMatcher::new(&self.containers, self.config.scan.max_item_rows).bind(client, request.lines())?;

        enter(stage, FlowStage::WritePrices);
        let tax_exempt = self.config.tax.is_exempt(request.project_type());
        let prices = PriceWriter::new(&self.containers, &self.config.header);
        for binding in &bindings {
            prices.write(client, binding, tax_exempt)?;
        }

        enter(stage, FlowStage::AssignTax);
        let assignment = self.config.tax.assignment(request.project_type());
        TaxAssigner::new(
            &self.containers,
            &self.config.markers.input_tax_label,
            self.config.scan.condition_rows,
        )
        .apply_all(client, &assignment, bindings.len(), self.config.tax.reapply_backward)?;
        self.settle();

        enter(stage, FlowStage::Save);
        self.click(&self.config.templates.save);
        self.settle();
        let event = ErrorClassifier::new(&self.config.markers).inspect(client)?;
        if let Some(reason) = event.failure() {
            return Err(reason.into());
        }

        enter(stage, FlowStage::Commit);
        self.click(&self.config.templates.confirm_save);
        self.settle();

        enter(stage, FlowStage::ReadOrderNumber);
        OutcomeEmitter::emit(client)
    }

    fn open_transaction(&self, client: &C) -> FlowResult<()> {
        let menu = client.require_address(screen::EASY_ACCESS_TREE)?;
        client.double_click_tree_node(&menu, &self.config.header.transaction_node)?;
        match client.resolve_address(screen::DOCUMENT_OVERVIEW_TOGGLE)? {
            Some(toggle) => client.press(&toggle)?,
            None => debug!("document overview already open"),
        }
        Ok(())
    }

    fn select_requisition(&self, client: &C, request: &OrderRequest) -> FlowResult<()> {
        let templates = &self.config.templates;
        self.click(&templates.create_order);
        self.click(&templates.requisition_selection);
        self.wait(self.config.timing.selection_settle());

        let field = client.require_address(screen::REQUISITION_NUMBER_FIELD)?;
        FieldWriter::new(client).set_and_confirm_at(
            &field,
            request.requisition_number().as_str(),
            screen::SHORT_FIELD_CARET,
        )?;

        self.click(&templates.open);
        self.click(&templates.accept);
        self.click(&templates.execute);
        self.settle();

        // The only popup the selection raises is "no data".
        if let Some(ok) = client.resolve_address(screen::POPUP_OK)? {
            client.press(&ok)?;
            return Err(FailureReason::NoRequisitionData.into());
        }
        Ok(())
    }

    fn select_lines(&self, client: &C, request: &OrderRequest) -> FlowResult<()> {
        let templates = &self.config.templates;
        self.double_click(&templates.requisition_items);
        self.settle();

        let selected =
            RequisitionLineSelector::select(client, request.lines().iter().map(|line| &line.requisition_line))?;
        info!(selected, "requisition lines selected");
        self.settle();

        self.click(&templates.adopt);
        self.settle();
        self.click(&templates.expand_header);
        self.settle();
        Ok(())
    }

    fn enter_header(&self, client: &C, request: &OrderRequest) -> FlowResult<SupplierCode> {
        let writer = FieldWriter::new(client);
        let header = &self.config.header;

        match self.containers.locate(client, screen::HEADER_ORG_TAB)? {
            Some(tab) => client.select(&tab)?,
            None => debug!("organization tab not offered"),
        }
        let org = self.containers.require(client, screen::PURCHASING_ORG_FIELD)?;
        writer.set_and_confirm_at(&org, &header.purchasing_org, screen::SHORT_FIELD_CARET)?;

        let scan = &self.config.scan;
        let supplier = SupplierResolver::new(
            self.aliases,
            &self.containers,
            &self.config.markers,
            scan.supplier_first_row..scan.supplier_end_row,
        )
        .resolve(client, request.supplier())?;

        let texts = self.containers.require(client, screen::HEADER_TEXTS_TAB)?;
        client.select(&texts)?;
        // Free text; the editor has nothing to validate.
        let editor = self.containers.require(client, screen::HEADER_TEXT_EDITOR)?;
        client.write_text(&editor, request.project_name())?;

        let payment = self.containers.require(client, screen::HEADER_PAYMENT_TAB)?;
        client.select(&payment)?;
        let terms = self.containers.require(client, screen::PAYMENT_TERMS_FIELD)?;
        writer.set_and_confirm(&terms, &header.payment_terms)?;

        self.click(&self.config.templates.collapse_header);
        self.settle();
        Ok(supplier)
    }

    fn locator(&self) -> ImageLocator<'a, M> {
        ImageLocator::new(self.screen, self.config.image.clone())
    }

    fn click(&self, template: &str) -> bool {
        self.locator().click(&self.config.templates.path(template))
    }

    fn double_click(&self, template: &str) -> bool {
        self.locator().double_click(&self.config.templates.path(template))
    }

    fn settle(&self) {
        self.wait(self.config.timing.settle());
    }

    fn wait(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

fn enter(stage: &mut FlowStage, next: FlowStage) {
    info!(stage = ?next, "stage");
    *stage = next;
}
