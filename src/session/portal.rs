use fieldreport_traits::PortalDocument;
use fieldreport_types::units::{PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use std::sync::Arc;

pub const PRINT_STYLE_ID: &str = "report-print-style";
pub const PRINT_ROOT_ID: &str = "report-print-root";

/// Print-media rules: only the portal prints, one A4 sheet per page, no margins.
pub fn print_style_sheet() -> String {
    format!(
        "@page {{ size: A4 portrait; margin: 0; }}\n\
         @media print {{\n  \
           body > *:not(#{root}) {{ display: none !important; }}\n  \
           #{root} {{ display: block; }}\n  \
           #{root} .report-page {{ width: {w}mm; height: {h}mm; overflow: hidden; page-break-after: always; }}\n  \
           #{root} .report-page:last-child {{ page-break-after: auto; }}\n\
         }}\n\
         @media screen {{ #{root} {{ position: fixed; left: -10000px; top: 0; }} }}\n",
        root = PRINT_ROOT_ID,
        w = PAGE_WIDTH_MM,
        h = PAGE_HEIGHT_MM,
    )
}

pub fn portal_document(document: Arc<Vec<u8>>, page_count: usize) -> PortalDocument {
    PortalDocument {
        root_id: PRINT_ROOT_ID.to_string(),
        style_id: PRINT_STYLE_ID.to_string(),
        style_sheet: print_style_sheet(),
        page_count,
        document,
    }
}
