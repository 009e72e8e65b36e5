//! Built-in grocery store catalog.
//!
//! Query text targets SQL Server (T-SQL) and is passed to the data source
//! untouched.

use super::{QueryCatalog, QueryDefinition, ScenarioDefinition};

const QUERIES: &[(&str, &str)] = &[
    (
        "In-Store Shopping",
        r#"
SELECT c.Customer_ID,
       c.First_name + ' ' + c.Last_name AS Customer_Name,
       st.Type_Name AS Shopping_Type,
       r.Date_of_purchase,
       r.Total_purchase_amount,
       sm.Method_Name AS Shopping_Method
FROM Customer c
JOIN Shopping_Types st ON c.Shopping_Type_ID = st.Type_ID
JOIN Receipt r ON c.Customer_ID = r.Customer_ID
JOIN Shopping_Methods sm ON r.Shopping_Method_ID = sm.Method_ID
WHERE st.Type_Name = 'In-Store' OR sm.Method_Name = 'In-Store'
"#,
    ),
    (
        "Online Shopping through Mobile App",
        r#"
SELECT c.Customer_ID,
       c.First_name + ' ' + c.Last_name AS Customer_Name,
       g.Date_of_purchase,
       g.Cart,
       g.Total_price,
       g.Pickup_time
FROM Grocery_app g
JOIN Customer c ON g.Customer_ID = c.Customer_ID
"#,
    ),
    (
        "Return Items at Physical Location",
        r#"
SELECT c.Customer_ID,
       c.First_name + ' ' + c.Last_name AS Customer_Name,
       r.Date_of_Return,
       i.Brand AS Returned_Item,
       r.Reason,
       rm.Method_Name AS Return_Method,
       cr.Return_Policy_Compliant
FROM Returns r
JOIN Customer c ON r.Customer_ID = c.Customer_ID
JOIN Return_Methods rm ON r.Return_Method_ID = rm.Method_ID
JOIN Item i ON r.Item_ID = i.Item_ID
JOIN Customer_Return cr ON r.Return_ID = cr.Return_ID
WHERE rm.Method_Name = 'In-Store'
"#,
    ),
    (
        "Check Return Policy Compliance",
        r#"
SELECT r.Return_ID,
       i.Brand,
       r.Date_of_Return,
       CASE WHEN cr.Return_Policy_Compliant = 1 THEN 'Compliant'
            ELSE 'Non-Compliant' END AS Policy_Status
FROM Returns r
JOIN Customer_Return cr ON r.Return_ID = cr.Return_ID
JOIN Item i ON cr.Item_ID = i.Item_ID
"#,
    ),
    (
        "Customer Purchase History",
        r#"
SELECT c.Customer_ID,
       c.First_name + ' ' + c.Last_name AS Customer_Name,
       i.Brand AS Item_Purchased,
       ph.Quantity,
       ph.Price,
       ph.Purchase_Date
FROM Purchase_History ph
JOIN Customer c ON ph.Customer_ID = c.Customer_ID
JOIN Item i ON ph.Item_ID = i.Item_ID
WHERE c.Customer_ID = 1
ORDER BY ph.Purchase_Date DESC
"#,
    ),
    (
        "Items Frequently Purchased",
        r#"
SELECT TOP 5 I.Item_ID,
       I.Brand,
       I.Stock,
       I.Purchase_Frequency AS Purchase_Frequency,
       I.Retail_Price
FROM Item I
ORDER BY I.Purchase_Frequency DESC
"#,
    ),
    (
        "Slow-Selling Items with Discount Strategy",
        r#"
SELECT TOP 10 I.Item_ID,
       I.Brand,
       I.Stock,
       I.Purchase_Frequency,
       I.Retail_Price,
       CASE WHEN I.Purchase_Frequency < 50 THEN 25
            WHEN I.Purchase_Frequency < 100 THEN 15
            ELSE 10 END AS Suggested_Discount_Percentage,
       I.Retail_Price * (1 - CASE WHEN I.Purchase_Frequency < 50 THEN 0.25
                                  WHEN I.Purchase_Frequency < 100 THEN 0.15
                                  ELSE 0.10 END) AS Discounted_Price
FROM Item I
ORDER BY I.Purchase_Frequency ASC
"#,
    ),
    (
        "Employees with Exceptional Comments",
        r#"
SELECT E.Employee_ID,
       E.First_Name + ' ' + E.Last_Name AS Employee_Name,
       E.Role,
       AVG(CF.Rating) AS Average_Rating,
       COUNT(CF.Feedback_ID) AS Total_Feedback_Count,
       CAST((SELECT TOP 1 Message FROM Customer_feedback
             WHERE Employee_ID = E.Employee_ID
             ORDER BY Rating DESC) AS VARCHAR(MAX)) AS Representative_Comment
FROM Employee E
JOIN Customer_feedback CF ON E.Employee_ID = CF.Employee_ID
GROUP BY E.Employee_ID, E.First_Name, E.Last_Name, E.Role
HAVING AVG(CF.Rating) >= 4.5
ORDER BY Average_Rating DESC
"#,
    ),
    (
        "Grocery Delivery Service Frequency",
        r#"
SELECT o.Order_Type_ID,
       ot.Type_Name AS Delivery_Type,
       COUNT(*) AS Delivery_Frequency,
       ROUND(COUNT(*) * 100.0 / (SELECT COUNT(*) FROM Orders), 2) AS Delivery_Percentage
FROM Orders o
JOIN Order_Types ot ON o.Order_Type_ID = ot.Type_ID
GROUP BY o.Order_Type_ID, ot.Type_Name
"#,
    ),
    (
        "Average Grocery Order Amounts",
        r#"
SELECT AVG(Total_amount) AS Average_Order_Amount,
       MIN(Total_amount) AS Minimum_Order_Amount,
       MAX(Total_amount) AS Maximum_Order_Amount,
       COUNT(*) AS Total_Orders,
       STDEV(Total_amount) AS Order_Amount_Variation,
       SUM(CASE WHEN Total_amount < 20 THEN 1 ELSE 0 END) AS Small_Orders,
       SUM(CASE WHEN Total_amount BETWEEN 20 AND 50 THEN 1 ELSE 0 END) AS Medium_Orders,
       SUM(CASE WHEN Total_amount > 50 THEN 1 ELSE 0 END) AS Large_Orders
FROM Orders
"#,
    ),
];

const SCENARIOS: &[(&str, &[usize])] = &[
    ("Customer Shopping", &[0, 1, 4]),
    ("Returns", &[2, 3]),
    ("Inventory and Pricing", &[5, 6]),
    ("Service Quality", &[7, 8, 9]),
];

pub(super) fn catalog() -> QueryCatalog {
    let queries = QUERIES
        .iter()
        .enumerate()
        .map(|(id, (name, sql))| QueryDefinition {
            id,
            display_name: (*name).to_string(),
            text: sql.trim().to_string(),
        })
        .collect();

    let scenarios = SCENARIOS
        .iter()
        .enumerate()
        .map(|(id, (name, members))| ScenarioDefinition {
            id,
            display_name: (*name).to_string(),
            member_query_ids: members.to_vec(),
        })
        .collect();

    QueryCatalog { queries, scenarios }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{QueryEntry, ScenarioEntry};

    #[test]
    fn test_builtin_catalog_shape() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.scenarios().len(), 4);
        assert_eq!(catalog.list_queries()[0].display_name, "In-Store Shopping");
        assert!(catalog
            .list_queries()
            .iter()
            .enumerate()
            .all(|(i, q)| q.id == i && !q.text.is_empty()));
    }

    #[test]
    fn test_display_names_carry_no_numbering() {
        // Ids are shown beside names; a "1. " prefix would disagree with 0-based ids.
        let catalog = catalog();
        for q in catalog.list_queries() {
            assert!(!q.display_name.starts_with(|c: char| c.is_ascii_digit()));
        }
        assert_eq!(
            crate::batch::separator_label(&catalog.list_queries()[0].display_name),
            "--- In-Store Shopping ---"
        );
    }

    #[test]
    fn test_builtin_catalog_passes_validation() {
        let catalog = catalog();
        let queries = catalog
            .list_queries()
            .iter()
            .map(|q| QueryEntry {
                name: q.display_name.clone(),
                sql: q.text.clone(),
            })
            .collect();
        let scenarios = catalog
            .scenarios()
            .iter()
            .map(|s| ScenarioEntry {
                name: s.display_name.clone(),
                queries: s.member_query_ids.clone(),
            })
            .collect();

        let rebuilt = QueryCatalog::new(queries, scenarios).unwrap();
        assert_eq!(rebuilt, catalog);
    }
}
