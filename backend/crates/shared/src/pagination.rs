//! Pagination - paging query parameters and the list envelope
//!
//! Every list endpoint accepts `pageNumber`, `pageSize`, `sortBy` and
//! `sortDirection` and answers with
//! `{ pagesCount, page, pageSize, totalCount, items }`.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_NUMBER: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// ソート方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// 不明な値は既定の `desc` として扱う
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    /// SQL の `ORDER BY` 句で使用するキーワード
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// クエリ文字列のページング項目
///
/// 値はすべて文字列として受け取り、[`PageParams::resolve`] で解釈します。
/// 不正な値でリクエスト全体を拒否しないためです。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page_number: Option<String>,
    pub page_size: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
}

impl PageParams {
    /// ページング指定を解決する
    ///
    /// `columns` は `(公開名, SQL 列名)` の許可リストで、先頭が既定のソート列です。
    /// 許可リストにない `sortBy` は既定の列に置き換えられます。
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::pagination::{PageParams, SortDirection};
    ///
    /// let params = PageParams {
    ///     page_size: Some("500".into()),
    ///     sort_by: Some("name; DROP TABLE blogs".into()),
    ///     ..Default::default()
    /// };
    /// let page = params.resolve(&[("createdAt", "created_at"), ("name", "name")]);
    /// assert_eq!(page.size, 100);
    /// assert_eq!(page.sort_column, "created_at");
    /// assert_eq!(page.direction, SortDirection::Desc);
    /// ```
    pub fn resolve(&self, columns: &[(&str, &'static str)]) -> Page {
        let number = parse_positive(self.page_number.as_deref()).unwrap_or(DEFAULT_PAGE_NUMBER);
        let size = parse_positive(self.page_size.as_deref())
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);

        let default_column = columns.first().map(|(_, column)| *column).unwrap_or("created_at");
        let sort_column = self
            .sort_by
            .as_deref()
            .and_then(|requested| {
                columns
                    .iter()
                    .find(|(name, _)| *name == requested)
                    .map(|(_, column)| *column)
            })
            .unwrap_or(default_column);

        let direction = self
            .sort_direction
            .as_deref()
            .map(SortDirection::parse)
            .unwrap_or_default();

        Page {
            number,
            size,
            sort_column,
            direction,
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
}

/// 解決済みのページ指定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
    pub sort_column: &'static str,
    pub direction: SortDirection,
}

impl Page {
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.size)
    }
}

/// ページング済み一覧のレスポンス
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub pages_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub items: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total_count: u64, page: &Page) -> Self {
        Self {
            pages_count: total_count.div_ceil(u64::from(page.size)),
            page: page.number,
            page_size: page.size,
            total_count,
            items,
        }
    }

    /// 要素を変換する（行からビューへ）
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            pages_count: self.pages_count,
            page: self.page,
            page_size: self.page_size,
            total_count: self.total_count,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}
