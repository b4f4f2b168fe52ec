use super::*;
use rstest::rstest;

fn request(page: u32, per_page: u32) -> PageRequest {
    PageRequest { page, per_page }
}

#[test]
fn test_missing_parameters_use_defaults() {
    let parsed: PageRequest = serde_json::from_str("{}").unwrap();
    assert_eq!(parsed.page, 1);
    assert_eq!(parsed.per_page, 20);
    assert_eq!(parsed.offset(), 0);
}

#[rstest]
#[case(request(1, 20), 0, 20)]
#[case(request(3, 25), 50, 25)]
#[case(request(3, 1_000), 200, 100)]
#[case(request(0, 0), 0, 1)]
fn test_offset_and_limit(#[case] req: PageRequest, #[case] offset: u64, #[case] limit: u64) {
    assert_eq!(req.offset(), offset);
    assert_eq!(req.limit(), limit);
}

#[rstest]
#[case(request(1, 10), 25, 3, true)]
#[case(request(3, 10), 25, 3, false)]
#[case(request(1, 10), 0, 1, false)]
#[case(request(2, 10), 20, 2, false)]
fn test_page_meta(
    #[case] req: PageRequest,
    #[case] total: u64,
    #[case] total_pages: u32,
    #[case] has_more: bool,
) {
    let response: PageResponse<u8> = PageResponse::new(Vec::new(), &req, total);
    assert_eq!(response.meta.total_pages, total_pages);
    assert_eq!(response.meta.has_more, has_more);
}

#[test]
fn test_meta_reports_clamped_page_size() {
    let response = PageResponse::new(vec!["INV-0001"], &request(0, 500), 1);
    assert_eq!(
        response.meta,
        PageMeta {
            page: 1,
            per_page: 100,
            total: 1,
            total_pages: 1,
            has_more: false,
        }
    );
}
