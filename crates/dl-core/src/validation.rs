use crate::error::EventError;
use crate::types::{EventFilter, EventListParams, EventOrder, EventQuery, Severity, SortDirection};

/// Validates the raw query string of the list endpoint.
///
/// `order` and `sort` are checked against their allow-lists before anything
/// else, so a bad combination never reaches the store. When `order` is
/// present `sort` is mandatory.
pub fn parse_event_query(params: &EventListParams) -> Result<EventQuery, EventError> {
    let (order, sort) = parse_order_and_sort(params.order.as_deref(), params.sort.as_deref())?;
    let filter = EventFilter {
        types: parse_type_list(params.event_type.as_deref()),
        severities: parse_severity_list(params.severity.as_deref())?,
    };
    let page = parse_page(params.page.as_deref())?;
    Ok(EventQuery {
        filter,
        order,
        sort,
        page,
    })
}

pub fn parse_order_and_sort(
    order: Option<&str>,
    sort: Option<&str>,
) -> Result<(EventOrder, SortDirection), EventError> {
    let sort = match sort {
        Some(value) => Some(SortDirection::parse(value).ok_or_else(|| {
            EventError::InvalidSort {
                value: value.to_string(),
            }
        })?),
        None => None,
    };

    match order.filter(|value| !value.is_empty()) {
        Some(value) => {
            let order = EventOrder::parse(value).ok_or_else(|| EventError::InvalidOrder {
                value: value.to_string(),
            })?;
            let sort = sort.ok_or_else(|| EventError::InvalidSort {
                value: String::new(),
            })?;
            Ok((order, sort))
        }
        None => Ok((EventOrder::Date, SortDirection::Desc)),
    }
}

pub fn parse_type_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn parse_severity_list(value: Option<&str>) -> Result<Vec<Severity>, EventError> {
    let Some(list) = value else {
        return Ok(Vec::new());
    };
    let mut severities = Vec::new();
    for item in list.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        let level = item.parse::<i64>().map_err(|_| EventError::InvalidInput {
            message: format!("severity must be an integer: {item}"),
        })?;
        let severity = Severity::from_level(level).map_err(|err| EventError::InvalidInput {
            message: err.to_string(),
        })?;
        if !severities.contains(&severity) {
            severities.push(severity);
        }
    }
    Ok(severities)
}

pub fn parse_page(value: Option<&str>) -> Result<u32, EventError> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value.parse::<u32>().map_err(|_| EventError::InvalidInput {
            message: format!("page must be a non-negative integer: {value}"),
        }),
        None => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(order: Option<&str>, sort: Option<&str>) -> EventListParams {
        EventListParams {
            order: order.map(str::to_string),
            sort: sort.map(str::to_string),
            ..EventListParams::default()
        }
    }

    #[test]
    fn defaults_to_date_descending() {
        let query = parse_event_query(&EventListParams::default()).unwrap();
        assert_eq!(query.order, EventOrder::Date);
        assert_eq!(query.sort, SortDirection::Desc);
        assert_eq!(query.page, 0);
        assert!(query.filter.is_empty());
    }

    #[test]
    fn accepts_every_allowed_combination() {
        for order in ["type", "date", "user"] {
            for sort in ["asc", "desc"] {
                let query = parse_event_query(&params(Some(order), Some(sort))).unwrap();
                assert_eq!(query.order.as_str(), order);
                assert_eq!(query.sort.as_str(), sort);
            }
        }
    }

    #[test]
    fn rejects_unknown_order() {
        let err = parse_event_query(&params(Some("hostname"), Some("asc"))).unwrap_err();
        assert!(matches!(err, EventError::InvalidOrder { .. }));
    }

    #[test]
    fn rejects_order_without_valid_sort() {
        assert!(matches!(
            parse_event_query(&params(Some("type"), None)),
            Err(EventError::InvalidSort { .. })
        ));
        assert!(matches!(
            parse_event_query(&params(Some("type"), Some("sideways"))),
            Err(EventError::InvalidSort { .. })
        ));
        assert!(matches!(
            parse_event_query(&params(None, Some("up"))),
            Err(EventError::InvalidSort { .. })
        ));
    }

    #[test]
    fn splits_filter_lists() {
        let query = parse_event_query(&EventListParams {
            event_type: Some("php, cron,,".to_string()),
            severity: Some("3,4,3".to_string()),
            page: Some("2".to_string()),
            ..EventListParams::default()
        })
        .unwrap();
        assert_eq!(query.filter.types, vec!["php", "cron"]);
        assert_eq!(
            query.filter.severities,
            vec![Severity::Error, Severity::Warning]
        );
        assert_eq!(query.offset(), 100);
    }

    #[test]
    fn trims_type_names() {
        assert_eq!(parse_type_list(Some(" php , cron ,")), vec!["php", "cron"]);
        assert_eq!(parse_type_list(Some("page not found")), vec!["page not found"]);
        assert!(parse_type_list(Some(" , ")).is_empty());
        assert!(parse_type_list(None).is_empty());
    }

    #[test]
    fn rejects_bad_severity_and_page() {
        assert!(parse_severity_list(Some("9")).is_err());
        assert!(parse_severity_list(Some("warning")).is_err());
        assert!(parse_page(Some("-1")).is_err());
        assert_eq!(parse_page(Some("")).unwrap(), 0);
    }
}
