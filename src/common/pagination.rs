// src/common/pagination.rs

use std::str::FromStr;

use serde::Deserialize;
use utoipa::IntoParams;

use crate::common::error::AppError;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

// Query string das listagens: ?page=0&pageSize=10&status=pending
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Página começando em 0
    pub page: Option<u32>,
    /// Itens por página (1..=100, padrão 10)
    pub page_size: Option<u32>,
    /// `all` ou um status do registro
    pub status: Option<String>,
}

/// Página validada, traduzida para o `range(from, to)` do banco.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u32,
    pub page_size: u32,
}

impl PageParams {
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Result<Self, AppError> {
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(AppError::InvalidPagination);
        }
        Ok(Self {
            page: page.unwrap_or(0),
            page_size,
        })
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

// `None` ou "all" = sem filtro
pub fn parse_status_filter<T: FromStr>(raw: Option<&str>) -> Result<Option<T>, AppError> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::InvalidStatusFilter(value.to_string())),
    }
}

impl ListQuery {
    pub fn page_params(&self) -> Result<PageParams, AppError> {
        PageParams::new(self.page, self.page_size)
    }

    pub fn status_filter<T: FromStr>(&self) -> Result<Option<T>, AppError> {
        parse_status_filter(self.status.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::donation::DonationStatus;

    #[test]
    fn defaults_to_first_page_of_ten() {
        let page = PageParams::new(None, None).unwrap();
        assert_eq!(page, PageParams { page: 0, page_size: 10 });
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn offset_matches_zero_based_range() {
        let page = PageParams::new(Some(3), Some(25)).unwrap();
        assert_eq!(page.offset(), 75);
    }

    #[test]
    fn rejects_empty_or_oversized_pages() {
        assert!(matches!(PageParams::new(None, Some(0)), Err(AppError::InvalidPagination)));
        assert!(matches!(PageParams::new(None, Some(101)), Err(AppError::InvalidPagination)));
    }

    #[test]
    fn status_filter_all_means_no_filter() {
        assert_eq!(parse_status_filter::<DonationStatus>(Some("all")).unwrap(), None);
        assert_eq!(parse_status_filter::<DonationStatus>(None).unwrap(), None);
        assert_eq!(
            parse_status_filter::<DonationStatus>(Some("approved")).unwrap(),
            Some(DonationStatus::Approved)
        );
        assert!(matches!(
            parse_status_filter::<DonationStatus>(Some("collected")),
            Err(AppError::InvalidStatusFilter(_))
        ));
    }
}
