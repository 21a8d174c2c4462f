//! Page request and page result types

use serde::{Deserialize, Serialize};
use crate::utils::errors::{Result, TripBuddyError};
use crate::utils::helpers::{calculate_offset, total_pages};

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Reject pages below 1 and limits outside `1..=max_limit`
    pub fn validate(&self, max_limit: u32) -> Result<()> {
        if self.page == 0 {
            return Err(TripBuddyError::InvalidInput("page must be at least 1".to_string()));
        }
        if self.limit == 0 || self.limit > max_limit {
            return Err(TripBuddyError::InvalidInput(format!(
                "limit must be between 1 and {}",
                max_limit
            )));
        }
        Ok(())
    }

    pub fn offset(&self) -> i64 {
        calculate_offset(self.page, self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
        }
    }

    pub fn total_pages(&self) -> i64 {
        total_pages(self.total, self.limit)
    }

    /// Slice an already fully ordered collection
    pub fn from_ordered(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as i64;
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit as usize)
            .collect();
        Self::new(items, total, request)
    }
}
