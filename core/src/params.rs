//! Typed flattening of request fields into query parameters.
//!
//! A type implements `ToParams` by naming each field it exposes. Nested
//! values get dotted keys (`filter.name`), list items get their index
//! (`ids.0`, `ids.1`). Empty strings and `None` are skipped, except that an
//! empty string inside a list still takes its index slot.

use std::collections::BTreeMap;

/// A scalar that can be written as a single parameter value.
pub trait ParamValue {
    /// `None` means the parameter is omitted.
    fn to_param(&self) -> Option<String>;

    /// Value written for a list item. `None` leaves the index unused.
    fn to_list_item(&self) -> Option<String> {
        self.to_param()
    }
}

impl ParamValue for str {
    fn to_param(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.to_string())
    }

    fn to_list_item(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl ParamValue for String {
    fn to_param(&self) -> Option<String> {
        self.as_str().to_param()
    }

    fn to_list_item(&self) -> Option<String> {
        self.as_str().to_list_item()
    }
}

impl<T: ParamValue + ?Sized> ParamValue for &T {
    fn to_param(&self) -> Option<String> {
        (**self).to_param()
    }

    fn to_list_item(&self) -> Option<String> {
        (**self).to_list_item()
    }
}

impl<T: ParamValue> ParamValue for Option<T> {
    fn to_param(&self) -> Option<String> {
        self.as_ref().and_then(ParamValue::to_param)
    }

    fn to_list_item(&self) -> Option<String> {
        self.as_ref().and_then(ParamValue::to_list_item)
    }
}

macro_rules! display_param {
    ($($ty:ty),*) => {
        $(
            impl ParamValue for $ty {
                fn to_param(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

display_param!(bool, i32, i64, u32, u64, usize, f32, f64);

/// Types that know how to describe themselves as query parameters.
pub trait ToParams {
    fn write_params(&self, out: &mut ParamWriter<'_>);
}

impl<T: ToParams + ?Sized> ToParams for &T {
    fn write_params(&self, out: &mut ParamWriter<'_>) {
        (**self).write_params(out)
    }
}

/// Writes flattened parameters into a request's param map.
pub struct ParamWriter<'a> {
    params: &'a mut BTreeMap<String, String>,
    prefix: String,
}

impl<'a> ParamWriter<'a> {
    pub fn new(params: &'a mut BTreeMap<String, String>) -> Self {
        Self {
            params,
            prefix: String::new(),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    fn child(&mut self, prefix: String) -> ParamWriter<'_> {
        ParamWriter {
            params: &mut *self.params,
            prefix,
        }
    }

    pub fn value<V: ParamValue + ?Sized>(&mut self, name: &str, value: &V) -> &mut Self {
        if let Some(v) = value.to_param() {
            let key = self.key(name);
            self.params.insert(key, v);
        }
        self
    }

    pub fn list<V: ParamValue>(&mut self, name: &str, items: &[V]) -> &mut Self {
        for (i, item) in items.iter().enumerate() {
            if let Some(v) = item.to_list_item() {
                let key = self.key(&format!("{name}.{i}"));
                self.params.insert(key, v);
            }
        }
        self
    }

    pub fn nested<P: ToParams + ?Sized>(&mut self, name: &str, value: &P) -> &mut Self {
        let prefix = format!("{}.", self.key(name));
        value.write_params(&mut self.child(prefix));
        self
    }

    pub fn nested_list<P: ToParams>(&mut self, name: &str, items: &[P]) -> &mut Self {
        for (i, item) in items.iter().enumerate() {
            let prefix = format!("{}.{i}.", self.key(name));
            item.write_params(&mut self.child(prefix));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{BaseRequest, Request};

    struct Page {
        offset: u32,
        limit: Option<u32>,
    }

    impl ToParams for Page {
        fn write_params(&self, out: &mut ParamWriter<'_>) {
            out.value("Offset", &self.offset).value("Limit", &self.limit);
        }
    }

    struct Filter {
        name: String,
        value: String,
    }

    impl ToParams for Filter {
        fn write_params(&self, out: &mut ParamWriter<'_>) {
            out.value("Name", &self.name).value("Value", &self.value);
        }
    }

    struct DescribeInstances {
        region: String,
        dry_run: bool,
        ratio: f64,
        ids: Vec<String>,
        page: Page,
        filters: Vec<Filter>,
    }

    impl ToParams for DescribeInstances {
        fn write_params(&self, out: &mut ParamWriter<'_>) {
            out.value("Region", &self.region)
                .value("DryRun", &self.dry_run)
                .value("Ratio", &self.ratio)
                .list("InstanceIds", &self.ids)
                .nested("Page", &self.page)
                .nested_list("Filters", &self.filters);
        }
    }

    #[test]
    fn flattens_scalars_lists_and_nested_values() {
        let source = DescribeInstances {
            region: "ap-guangzhou".to_string(),
            dry_run: false,
            ratio: 1.5,
            ids: vec!["ins-1".to_string(), "ins-2".to_string()],
            page: Page {
                offset: 20,
                limit: None,
            },
            filters: vec![Filter {
                name: "zone".to_string(),
                value: String::new(),
            }],
        };

        let mut req = BaseRequest::new();
        req.construct_params(&source);
        let params = req.params();

        assert_eq!(params["Region"], "ap-guangzhou");
        assert_eq!(params["DryRun"], "false");
        assert_eq!(params["Ratio"], "1.5");
        assert_eq!(params["InstanceIds.0"], "ins-1");
        assert_eq!(params["InstanceIds.1"], "ins-2");
        assert_eq!(params["Page.Offset"], "20");
        assert!(!params.contains_key("Page.Limit"));
        assert_eq!(params["Filters.0.Name"], "zone");
        assert!(!params.contains_key("Filters.0.Value"));
        assert_eq!(params.len(), 7);
    }

    #[test]
    fn empty_string_is_skipped() {
        let mut params = BTreeMap::new();
        ParamWriter::new(&mut params).value("a", "").value("b", "x");
        assert_eq!(params.len(), 1);
        assert_eq!(params["b"], "x");
    }

    #[test]
    fn empty_list_items_keep_their_index() {
        let mut params = BTreeMap::new();
        let ids = vec![Some("a"), Some(""), None, Some("d")];
        ParamWriter::new(&mut params).list("Ids", &ids);
        assert_eq!(params["Ids.0"], "a");
        assert_eq!(params["Ids.1"], "");
        assert!(!params.contains_key("Ids.2"));
        assert_eq!(params["Ids.3"], "d");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn whole_floats_have_no_fraction() {
        assert_eq!(10.0_f64.to_param().as_deref(), Some("10"));
    }
}
