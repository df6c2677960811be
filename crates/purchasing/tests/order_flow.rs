use procurebot_core::{FailureReason, MaterialCode, OrderNumber, Outcome, RequisitionLine, RequisitionNumber};
use procurebot_navigation::{Action, InMemorySession, LocatorSettings, SessionStatus, TreeNode};
use procurebot_purchasing::screen;
use procurebot_purchasing::{
    FlowConfig, FlowReport, FlowStage, FlowTiming, OrderCreationFlow, OrderLine, OrderRequest, Price, ProjectType,
    SupplierAliases,
};
use proptest::prelude::*;

const CONTAINER: &str = "SUB0:SAPLMEGUI:0013";
const RENAMED_CONTAINER: &str = "SUB0:SAPLMEGUI:0016";
const RATE_LABEL: &str = "进项税率";
const SUPPLIER: &str = "ACME Cables";
const SUPPLIER_CODE: &str = "1000077777";
const CONFIRMATION: &str = "Standard PO created under the number 4500123456";
/// Set once the final save button was clicked; never probed by the flow.
const COMMITTED: &str = "fixture/committed";

const TEMPLATES: [&str; 11] = [
    "create_order.png",
    "cg_order.png",
    "open.png",
    "accept.png",
    "execute.png",
    "open_order_info.png",
    "cy.PNG",
    "title_open.png",
    "title.png",
    "save.png",
    "save1.png",
];

fn at(sub: &str) -> String {
    format!("wnd[0]/usr/sub{CONTAINER}/{sub}")
}

fn cell(sub: &str, column: usize, row: usize) -> String {
    format!("wnd[0]/usr/sub{CONTAINER}/{sub}[{column},{row}]")
}

fn line(code: &str, price: &str, req_line: &str) -> OrderLine {
    OrderLine::new(
        MaterialCode::new(code).unwrap(),
        Price::new(price).unwrap(),
        RequisitionLine::new(req_line).unwrap(),
    )
}

fn request_with(supplier: &str, project_type: &str, lines: Vec<OrderLine>) -> OrderRequest {
    OrderRequest::new(
        RequisitionNumber::new("1000123").unwrap(),
        supplier,
        "Substation 7 cabling",
        ProjectType::new(project_type),
        lines,
    )
    .unwrap()
}

fn lines(count: usize) -> Vec<OrderLine> {
    (0..count)
        .map(|i| line(&format!("5{i:05}"), &format!("{}.5", 10 + i), &format!("{}", (i + 1) * 10)))
        .collect()
}

fn request(count: usize) -> OrderRequest {
    request_with(SUPPLIER, "upgrade", lines(count))
}

fn config() -> FlowConfig {
    FlowConfig {
        timing: FlowTiming::none(),
        image: LocatorSettings {
            confidence: 0.8,
            timeout_ms: 50,
            poll_interval_ms: 1,
        },
        ..FlowConfig::default()
    }
}

fn aliases() -> SupplierAliases {
    [(SUPPLIER.to_string(), procurebot_core::SupplierCode::new(SUPPLIER_CODE).unwrap())]
        .into_iter()
        .collect()
}

/// A remote client showing the order screen for `material_codes`.
///
/// The item table lists the codes in the order given; the requisition tree
/// offers `tree_lines`.
fn remote(material_codes: &[String], tree_lines: &[String]) -> InMemorySession {
    let session = InMemorySession::new();

    session.put(screen::EASY_ACCESS_TREE, "");
    session.put(screen::DOCUMENT_OVERVIEW_TOGGLE, "");
    session.put(screen::REQUISITION_NUMBER_FIELD, "");
    session.put(screen::STATUS_BAR, "");
    session.put(screen::BACK_BUTTON, "");
    session.set_tree(
        screen::REQUISITION_TREE,
        tree_lines
            .iter()
            .enumerate()
            .map(|(i, l)| TreeNode::new(format!("N{i}"), l.clone()))
            .collect(),
    );
    for template in TEMPLATES {
        session.show_template(template);
    }

    for sub in [
        screen::HEADER_ORG_TAB,
        screen::PURCHASING_ORG_FIELD,
        screen::SUPPLIER_FIELD,
        screen::HEADER_TEXTS_TAB,
        screen::HEADER_TEXT_EDITOR,
        screen::HEADER_PAYMENT_TAB,
        screen::PAYMENT_TERMS_FIELD,
        screen::ITEM_CONDITIONS_TAB,
        screen::ITEM_INVOICE_TAB,
        screen::ITEM_TAX_CODE_FIELD,
        screen::PREVIOUS_ITEM_BUTTON,
        screen::NEXT_ITEM_BUTTON,
    ] {
        session.put(at(sub), "");
    }
    for (row, code) in material_codes.iter().enumerate() {
        session.put(cell(screen::ITEM_MATERIAL, 4, row), code.as_str());
        session.put(cell(screen::ITEM_NET_PRICE, 10, row), "");
        session.put(cell(screen::ITEM_CURRENCY, 11, row), "");
        session.put(cell(screen::ITEM_PRICE_UNIT, 12, row), "");
    }
    for (row, label) in ["Gross price", "Freight", RATE_LABEL].iter().enumerate() {
        session.put(cell(screen::CONDITION_LABEL, 2, row), *label);
        session.put(cell(screen::CONDITION_AMOUNT, 3, row), "");
    }

    // The confirmation only exists once the order was actually committed.
    session.on_click("save1.png", |state| state.put(COMMITTED, ""));
    session.on(Action::DoubleClick(screen::STATUS_BAR.into()), |state| {
        if state.text(COMMITTED).is_some() {
            state.put(screen::CONFIRMATION_LABEL, CONFIRMATION);
            state.put(screen::POPUP_OK, "");
        }
    });
    session.on_press(screen::POPUP_OK, |state| state.remove(screen::POPUP_WINDOW));
    session
}

/// Remote client matching `request`, item rows in reverse order.
fn remote_for(request: &OrderRequest) -> InMemorySession {
    let codes: Vec<String> = request
        .lines()
        .iter()
        .rev()
        .map(|l| l.material_code.to_string())
        .collect();
    let tree: Vec<String> = request
        .lines()
        .iter()
        .map(|l| l.requisition_line.to_string())
        .collect();
    remote(&codes, &tree)
}

fn run(session: &InMemorySession, request: &OrderRequest) -> FlowReport {
    run_with(session, request, &aliases())
}

fn run_with(session: &InMemorySession, request: &OrderRequest, aliases: &SupplierAliases) -> FlowReport {
    let config = config();
    OrderCreationFlow::new(session, session, &config, aliases).run_with_report(request)
}

fn assert_lease_returned(session: &InMemorySession) {
    assert!(session.history_enabled(), "input history left disabled");
    assert_eq!(session.count(&Action::Release), 1, "handle not released exactly once");
}

#[test]
fn creates_order_and_reports_its_number() {
    let request = request(3);
    let session = remote_for(&request);

    let report = run(&session, &request);

    assert_eq!(report.outcome, Outcome::success(OrderNumber::new(4_500_123_456)));
    assert_eq!(report.last_stage, FlowStage::ReadOrderNumber);
    assert_eq!(report.requisition_number.as_str(), "1000123");
    assert!(report.finished_at >= report.started_at);
    assert_eq!(report.run_id.get_version_num(), 7);

    // Rows are listed in reverse, so line 0 sits in row 2.
    let prices = session.writes_to("MEPO1211-NETPR");
    assert_eq!(prices.len(), 3);
    assert!(prices.contains(&(cell(screen::ITEM_NET_PRICE, 10, 2), "10.5".to_string())));
    assert!(prices.contains(&(cell(screen::ITEM_NET_PRICE, 10, 0), "12.5".to_string())));

    assert_eq!(
        session.writes_to("SUPERFIELD"),
        vec![(at(screen::SUPPLIER_FIELD), SUPPLIER_CODE.to_string())]
    );
    assert_eq!(
        session.writes_to("MEPO1222-EKORG"),
        vec![(at(screen::PURCHASING_ORG_FIELD), "15A0".to_string())]
    );
    assert_eq!(
        session.writes_to("cntlTEXT_EDITOR_0101"),
        vec![(at(screen::HEADER_TEXT_EDITOR), "Substation 7 cabling".to_string())]
    );
    assert_eq!(
        session.writes_to("MEPO1226-ZTERM"),
        vec![(at(screen::PAYMENT_TERMS_FIELD), "TA01".to_string())]
    );

    // Forward pass and backward re-application.
    let rates = session.writes_to("KOMV-KBETR");
    assert_eq!(rates.len(), 6);
    assert!(rates.iter().all(|(path, value)| path == &cell(screen::CONDITION_AMOUNT, 3, 2) && value == "13"));
    let codes = session.writes_to("MEPO1317-MWSKZ");
    assert_eq!(codes.len(), 6);
    assert!(codes.iter().all(|(_, value)| value == "U2"));

    assert_eq!(
        session.count(&Action::SelectNode {
            tree: screen::REQUISITION_TREE.into(),
            key: "N1".into()
        }),
        1
    );
    assert_eq!(session.count(&Action::Click("save1.png".into())), 1);
    assert_eq!(session.count(&Action::Press(screen::BACK_BUTTON.into())), 1);
    assert_lease_returned(&session);
}

#[test]
fn exempt_project_uses_gross_price_and_exempt_tax() {
    let request = request_with(
        SUPPLIER,
        "新住配完善",
        vec![line("500001", "100", "10").with_gross_price(Price::new("113").unwrap())],
    );
    let session = remote_for(&request);

    let report = run(&session, &request);

    assert!(report.outcome.is_success());
    assert_eq!(
        session.writes_to("MEPO1211-NETPR"),
        vec![(cell(screen::ITEM_NET_PRICE, 10, 0), "113".to_string())]
    );
    assert!(session.writes_to("KOMV-KBETR").iter().all(|(_, v)| v == "0"));
    assert!(session.writes_to("MEPO1317-MWSKZ").iter().all(|(_, v)| v == "J0"));
}

#[test]
fn material_missing_from_item_table_is_incomplete_line_data() {
    let request = request(2);
    let session = remote(&["500000".to_string()], &["10".to_string(), "20".to_string()]);

    let report = run(&session, &request);

    assert_eq!(report.outcome, Outcome::failure(FailureReason::IncompleteLineData));
    assert_eq!(report.last_stage, FlowStage::BindLines);
    assert!(session.writes_to("MEPO1211-NETPR").is_empty());
    assert!(session.writes_to("KOMV-KBETR").is_empty());
    assert!(session.writes_to("MEPO1317-MWSKZ").is_empty());
    assert_lease_returned(&session);
}

#[test]
fn requisition_line_missing_from_tree_is_incomplete_line_data() {
    let request = request(2);
    let codes: Vec<String> = request.lines().iter().map(|l| l.material_code.to_string()).collect();
    let session = remote(&codes, &["10".to_string()]);

    let report = run(&session, &request);

    assert_eq!(report.outcome, Outcome::failure(FailureReason::IncompleteLineData));
    assert_eq!(report.last_stage, FlowStage::SelectLines);
    assert_eq!(session.count(&Action::Click("cy.PNG".into())), 0);
    assert_lease_returned(&session);
}

#[test]
fn empty_requisition_selection_is_no_requisition_data() {
    let request = request(1);
    let session = remote_for(&request);
    session.on_click("execute.png", |state| state.put(screen::POPUP_OK, ""));

    let report = run(&session, &request);

    assert_eq!(report.outcome, Outcome::failure(FailureReason::NoRequisitionData));
    assert_eq!(report.last_stage, FlowStage::SelectRequisition);
    assert_eq!(session.count(&Action::Press(screen::POPUP_OK.into())), 1);
    assert_lease_returned(&session);
}

#[test]
fn budget_message_outranks_error_popup() {
    let request = request(2);
    let session = remote_for(&request);
    session.on_click("save.png", |state| {
        state.put(screen::MESSAGE_LIST_TEXT, "WBS C-1000123-01 超出预算 12.000,00 CNY");
        state.put(screen::POPUP_OK, "");
        state.put(screen::POPUP_TEXT, "凭证仍有错");
        state.put(screen::POPUP_CANCEL, "");
    });

    let report = run(&session, &request);

    assert_eq!(report.outcome, Outcome::failure(FailureReason::BudgetExceeded));
    assert_eq!(report.last_stage, FlowStage::Save);
    assert_eq!(session.count(&Action::Click("save1.png".into())), 0);
    assert_eq!(session.count(&Action::Press(screen::POPUP_CANCEL.into())), 0);
    assert_eq!(session.count(&Action::DoubleClick(screen::STATUS_BAR.into())), 0);
    assert_lease_returned(&session);
}

#[test]
fn unresolved_errors_stop_the_save() {
    let request = request(1);
    let session = remote_for(&request);
    session.on_click("save.png", |state| {
        state.put(screen::POPUP_TEXT, "凭证仍有错，仍要保存吗？");
        state.put(screen::POPUP_CANCEL, "");
    });

    let report = run(&session, &request);

    assert_eq!(report.outcome, Outcome::failure(FailureReason::DocumentStillInvalid));
    assert_eq!(session.count(&Action::Press(screen::POPUP_CANCEL.into())), 1);
    assert_lease_returned(&session);
}

#[test]
fn informational_popup_lets_the_save_continue() {
    let request = request(1);
    let session = remote_for(&request);
    session.on_click("save.png", |state| {
        state.put(screen::POPUP_TEXT, "系统消息已发出");
    });
    session.on_click("save1.png", |state| state.remove(screen::POPUP_WINDOW));

    let report = run(&session, &request);

    assert_eq!(report.outcome.order_number(), Some(OrderNumber::new(4_500_123_456)));
}

#[test]
fn unknown_supplier_is_picked_from_hit_list() {
    let request = request_with("  Riverside Switchgear ", "upgrade", lines(1));
    let session = remote_for(&request);
    session.put(screen::supplier_hit(3), "Riverside Switchgear Holding");
    session.put(screen::supplier_hit(4), "Riverside Switchgear");
    session.on(
        Action::Key {
            window: screen::POPUP_WINDOW.into(),
            code: 2,
        },
        |state| {
            state.put(
                format!("wnd[0]/usr/sub{CONTAINER}/{}", screen::SUPPLIER_FIELD),
                "1000088888",
            );
            state.remove(screen::POPUP_WINDOW);
        },
    );

    let report = run_with(&session, &request, &SupplierAliases::default());

    assert!(report.outcome.is_success());
    assert_eq!(session.count(&Action::Focus(screen::supplier_hit(4))), 1);
    assert_eq!(
        session.writes_to("SUPERFIELD"),
        vec![(at(screen::SUPPLIER_FIELD), "Riverside Switchgear".to_string())]
    );
}

#[test]
fn supplier_without_master_record_fails_before_prices() {
    let request = request_with("Nobody Ltd", "upgrade", lines(2));
    let session = remote_for(&request);
    session.on(
        Action::Write {
            path: at(screen::SUPPLIER_FIELD),
            value: "Nobody Ltd".into(),
        },
        |state| state.put(screen::STATUS_BAR, "供应商Nobody Ltd不存在主记录"),
    );

    let report = run_with(&session, &request, &SupplierAliases::default());

    assert_eq!(report.outcome, Outcome::failure(FailureReason::SupplierNotFound));
    assert_eq!(report.last_stage, FlowStage::EnterHeader);
    assert!(session.writes_to("MEPO1211-NETPR").is_empty());
    assert_lease_returned(&session);
}

#[test]
fn busy_session_fails_before_any_ui_action() {
    let request = request(1);
    let session = remote_for(&request);
    session.set_status(Some(SessionStatus {
        busy: true,
        ..SessionStatus::default()
    }));

    let report = run(&session, &request);

    assert_eq!(report.outcome, Outcome::failure(FailureReason::SessionBusy));
    assert_eq!(report.last_stage, FlowStage::AcquireSession);
    assert_eq!(
        session.actions(),
        vec![Action::History(false), Action::History(true), Action::Release]
    );
}

#[test]
fn missing_mandatory_element_is_unclassified() {
    let request = request(1);
    let session = remote_for(&request);
    session.remove(&at(screen::PAYMENT_TERMS_FIELD));

    let report = run(&session, &request);

    match report.outcome {
        Outcome::Failure {
            reason: FailureReason::UnclassifiedException(message),
        } => assert!(message.contains("MEPO1226-ZTERM"), "{message}"),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_lease_returned(&session);
}

#[test]
fn lost_connection_mid_flow_still_releases_the_handle() {
    let request = request(1);
    let session = remote_for(&request);
    session.on_click("save.png", |state| state.disconnect());

    let report = run(&session, &request);

    assert!(matches!(
        report.outcome.failure_reason(),
        Some(FailureReason::UnclassifiedException(_))
    ));
    assert_eq!(session.count(&Action::Release), 1);
}

#[test]
fn missed_commit_click_is_unknown_write_failure() {
    let request = request(2);
    let session = remote_for(&request);
    session.with_screen(|state| state.hide_template("save1.png"));

    let report = run(&session, &request);

    assert_eq!(report.outcome, Outcome::failure(FailureReason::UnknownWriteFailure));
    assert_eq!(report.last_stage, FlowStage::ReadOrderNumber);
    assert_eq!(session.count(&Action::Click("save.png".into())), 1);
    assert_eq!(session.count(&Action::Click("save1.png".into())), 0);
    assert_eq!(session.count(&Action::Press(screen::BACK_BUTTON.into())), 0);
    assert_lease_returned(&session);
}

#[test]
fn refused_commit_click_is_unknown_write_failure() {
    let request = request(1);
    let session = remote_for(&request);
    session.with_screen(|state| state.fail_clicks("save1.png"));

    let report = run(&session, &request);

    assert_eq!(report.outcome, Outcome::failure(FailureReason::UnknownWriteFailure));
    assert_lease_returned(&session);
}

#[test]
fn flaky_screen_capture_does_not_stop_the_run() {
    let request = request(1);
    let session = remote_for(&request);
    session.with_screen(|state| state.fail_probes(3));

    let report = run(&session, &request);

    assert_eq!(report.outcome.order_number(), Some(OrderNumber::new(4_500_123_456)));
}

#[test]
fn container_renamed_by_tab_switch_is_followed() {
    let request = request(2);
    let session = remote_for(&request);
    session.on_select(&at(screen::HEADER_TEXTS_TAB), |state| {
        state.rename_container(CONTAINER, RENAMED_CONTAINER);
    });

    let report = run(&session, &request);

    assert!(report.outcome.is_success(), "{:?}", report.outcome);
    let renamed = format!("wnd[0]/usr/sub{RENAMED_CONTAINER}/");
    assert!(session.writes_to("MEPO1226-ZTERM")[0].0.starts_with(&renamed));
    assert!(session.writes_to("MEPO1211-NETPR").iter().all(|(path, _)| path.starts_with(&renamed)));
}

#[test]
fn backward_tax_pass_can_be_switched_off() {
    let request = request(2);
    let session = remote_for(&request);
    let mut config = config();
    config.tax.reapply_backward = false;

    let report = OrderCreationFlow::new(&session, &session, &config, &aliases()).run_with_report(&request);

    assert!(report.outcome.is_success());
    assert_eq!(session.writes_to("MEPO1317-MWSKZ").len(), 2);
    assert_eq!(session.count(&Action::Press(at(screen::PREVIOUS_ITEM_BUTTON))), 0);
}

#[test]
fn outcome_serializes_for_the_caller() {
    let request = request(1);
    let session = remote_for(&request);

    let report = run(&session, &request);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["outcome"]["status"], "success");
    assert_eq!(json["outcome"]["order_number"], 4_500_123_456u64);
    assert_eq!(json["last_stage"], "read_order_number");
    assert_eq!(json["requisition_number"], "1000123");
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 8, ..ProptestConfig::default() })]

    #[test]
    fn every_present_line_gets_one_confirmed_price(count in 1usize..6) {
        let request = request(count);
        let session = remote_for(&request);

        let report = run(&session, &request);

        prop_assert!(report.outcome.is_success());
        prop_assert_eq!(session.writes_to("MEPO1211-NETPR").len(), count);
        prop_assert_eq!(session.writes_to("MEPO1211-PEINH").len(), count);
        prop_assert_eq!(session.history_enabled(), true);
        prop_assert_eq!(session.count(&Action::Release), 1);
    }
}
