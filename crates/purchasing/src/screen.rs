//! Element addresses of the purchase order transaction.
//!
//! Absolute addresses start with `wnd[..]`. The rest are relative to the
//! dynamic order-screen container and must go through
//! [`ContainerResolver`](procurebot_navigation::ContainerResolver).

// Absolute.
pub const EASY_ACCESS_TREE: &str = "wnd[0]/usr/cntlIMAGE_CONTAINER/shellcont/shell/shellcont[0]/shell";
pub const DOCUMENT_OVERVIEW_TOGGLE: &str = "wnd[0]/tbar[1]/btn[8]";
pub const REQUISITION_NUMBER_FIELD: &str = "wnd[0]/usr/ctxtSP$00026-LOW";
pub const REQUISITION_TREE: &str = "wnd[0]/shellcont/shell/shellcont[1]/shell[1]";
pub const STATUS_BAR: &str = "wnd[0]/sbar";
pub const BACK_BUTTON: &str = "wnd[0]/tbar[0]/btn[3]";

pub const POPUP_WINDOW: &str = "wnd[1]";
pub const POPUP_OK: &str = "wnd[1]/tbar[0]/btn[0]";
pub const POPUP_CANCEL: &str = "wnd[1]/usr/btnCANCEL";
pub const POPUP_TEXT: &str = "wnd[1]/usr/txtSPOP-TEXTLINE1";
pub const MESSAGE_LIST_TEXT: &str = "wnd[1]/usr/lbl[7,5]";
pub const CONFIRMATION_LABEL: &str = "wnd[1]/usr/lbl[1,2]";

/// Row `row` of the supplier search hit list.
pub fn supplier_hit(row: usize) -> String {
    format!("wnd[1]/usr/lbl[1,{row}]")
}

// Header, relative to the container.
pub const HEADER_ORG_TAB: &str = "subSUB1:SAPLMEVIEWS:1100/subSUB2:SAPLMEVIEWS:1200/subSUB1:SAPLMEGUI:1102/tabsHEADER_DETAIL/tabpTABHDT9";
pub const PURCHASING_ORG_FIELD: &str = "subSUB1:SAPLMEVIEWS:1100/subSUB2:SAPLMEVIEWS:1200/subSUB1:SAPLMEGUI:1102/tabsHEADER_DETAIL/tabpTABHDT9/ssubTABSTRIPCONTROL2SUB:SAPLMEGUI:1221/ctxtMEPO1222-EKORG";
pub const SUPPLIER_FIELD: &str = "subSUB0:SAPLMEGUI:0030/subSUB1:SAPLMEGUI:1105/ctxtMEPO_TOPLINE-SUPERFIELD";
pub const HEADER_TEXTS_TAB: &str = "subSUB1:SAPLMEVIEWS:1100/subSUB2:SAPLMEVIEWS:1200/subSUB1:SAPLMEGUI:1102/tabsHEADER_DETAIL/tabpTABHDT3";
pub const HEADER_TEXT_EDITOR: &str = "subSUB1:SAPLMEVIEWS:1100/subSUB2:SAPLMEVIEWS:1200/subSUB1:SAPLMEGUI:1102/tabsHEADER_DETAIL/tabpTABHDT3/ssubTABSTRIPCONTROL2SUB:SAPLMEGUI:1230/subTEXTS:SAPLMMTE:0100/subEDITOR:SAPLMMTE:0101/cntlTEXT_EDITOR_0101/shellcont/shell";
pub const HEADER_PAYMENT_TAB: &str = "subSUB1:SAPLMEVIEWS:1100/subSUB2:SAPLMEVIEWS:1200/subSUB1:SAPLMEGUI:1102/tabsHEADER_DETAIL/tabpTABHDT1";
pub const PAYMENT_TERMS_FIELD: &str = "subSUB1:SAPLMEVIEWS:1100/subSUB2:SAPLMEVIEWS:1200/subSUB1:SAPLMEGUI:1102/tabsHEADER_DETAIL/tabpTABHDT1/ssubTABSTRIPCONTROL2SUB:SAPLMEGUI:1226/ctxtMEPO1226-ZTERM";

// Item overview table, relative to the container. Cells take `[column,row]`.
pub const ITEM_MATERIAL: &str = "subSUB2:SAPLMEVIEWS:1100/subSUB2:SAPLMEVIEWS:1200/subSUB1:SAPLMEGUI:1211/tblSAPLMEGUITC_1211/ctxtMEPO1211-EMATN";
pub const ITEM_MATERIAL_COLUMN: usize = 4;
pub const ITEM_NET_PRICE: &str = "subSUB2:SAPLMEVIEWS:1100/subSUB2:SAPLMEVIEWS:1200/subSUB1:SAPLMEGUI:1211/tblSAPLMEGUITC_1211/txtMEPO1211-NETPR";
pub const ITEM_NET_PRICE_COLUMN: usize = 10;
pub const ITEM_CURRENCY: &str = "subSUB2:SAPLMEVIEWS:1100/subSUB2:SAPLMEVIEWS:1200/subSUB1:SAPLMEGUI:1211/tblSAPLMEGUITC_1211/txtMEPO1211-WAERS";
pub const ITEM_CURRENCY_COLUMN: usize = 11;
pub const ITEM_PRICE_UNIT: &str = "subSUB2:SAPLMEVIEWS:1100/subSUB2:SAPLMEVIEWS:1200/subSUB1:SAPLMEGUI:1211/tblSAPLMEGUITC_1211/txtMEPO1211-PEINH";
pub const ITEM_PRICE_UNIT_COLUMN: usize = 12;

// Item detail, relative to the container.
pub const ITEM_CONDITIONS_TAB: &str = "subSUB3:SAPLMEVIEWS:1100/subSUB2:SAPLMEVIEWS:1200/subSUB1:SAPLMEGUI:1301/subSUB2:SAPLMEGUI:1303/tabsITEM_DETAIL/tabpTABIDT8";
pub const CONDITION_LABEL: &str = "subSUB3:SAPLMEVIEWS:1100/subSUB2:SAPLMEVIEWS:1200/subSUB1:SAPLMEGUI:1301/subSUB2:SAPLMEGUI:1303/tabsITEM_DETAIL/tabpTABIDT8/ssubTABSTRIPCONTROL1SUB:SAPLMEGUI:1333/ssubSUB0:SAPLV69A:6201/tblSAPLV69ATCTRL_KONDITIONEN/txtT685T-VTEXT";
pub const CONDITION_LABEL_COLUMN: usize = 2;
pub const CONDITION_AMOUNT: &str = "subSUB3:SAPLMEVIEWS:1100/subSUB2:SAPLMEVIEWS:1200/subSUB1:SAPLMEGUI:1301/subSUB2:SAPLMEGUI:1303/tabsITEM_DETAIL/tabpTABIDT8/ssubTABSTRIPCONTROL1SUB:SAPLMEGUI:1333/ssubSUB0:SAPLV69A:6201/tblSAPLV69ATCTRL_KONDITIONEN/txtKOMV-KBETR";
pub const CONDITION_AMOUNT_COLUMN: usize = 3;
pub const ITEM_INVOICE_TAB: &str = "subSUB3:SAPLMEVIEWS:1100/subSUB2:SAPLMEVIEWS:1200/subSUB1:SAPLMEGUI:1301/subSUB2:SAPLMEGUI:1303/tabsITEM_DETAIL/tabpTABIDT7";
pub const ITEM_TAX_CODE_FIELD: &str = "subSUB3:SAPLMEVIEWS:1100/subSUB2:SAPLMEVIEWS:1200/subSUB1:SAPLMEGUI:1301/subSUB2:SAPLMEGUI:1303/tabsITEM_DETAIL/tabpTABIDT7/ssubTABSTRIPCONTROL1SUB:SAPLMEGUI:1317/ctxtMEPO1317-MWSKZ";
pub const PREVIOUS_ITEM_BUTTON: &str = "subSUB3:SAPLMEVIEWS:1100/subSUB2:SAPLMEVIEWS:1200/subSUB1:SAPLMEGUI:1301/subSUB1:SAPLMEGUI:6000/btn%#AUTOTEXT001";
pub const NEXT_ITEM_BUTTON: &str = "subSUB3:SAPLMEVIEWS:1100/subSUB2:SAPLMEVIEWS:1200/subSUB1:SAPLMEGUI:1301/subSUB1:SAPLMEGUI:6000/btn%#AUTOTEXT002";

/// Caret positions the search fields expect before Enter.
pub const SHORT_FIELD_CARET: usize = 3;
pub const SUPERFIELD_CARET: usize = 42;
