mod common;

use autoquery_configuration::QuerySettings;
use common::{int, text};
use query_engine_metadata::metadata::{Operator, ScalarType};
use query_engine_translation::translation::error::Error;
use query_engine_translation::translation::query::{self, templates::Template, QueryRequest};

mod filters {
    use super::*;

    #[tokio::test]
    async fn equality_on_a_declared_field() {
        let sql = common::test_translation(QueryRequest::new("QueryRockstars").field("Age", 27))
            .await
            .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"SELECT "Rockstar"."Id" AS "Id", "Rockstar"."FirstName" AS "FirstName", "Rockstar"."LastName" AS "LastName", "Rockstar"."Age" AS "Age", "Rockstar"."DateOfBirth" AS "DateOfBirth", "Rockstar"."DateDied" AS "DateDied", "Rockstar"."LivingStatus" AS "LivingStatus" FROM "main"."Rockstar" AS "Rockstar" WHERE ("Rockstar"."Age" = $1) LIMIT 100"#);
        assert_eq!(sql.params, vec![int(27)], "{}", common::pretty(&sql.sql));
    }

    #[tokio::test]
    async fn suffix_conventions() {
        let sql = common::test_condition(
            QueryRequest::new("QueryRockstarsConventions").field("AgeOlderThan", 42),
        )
        .await
        .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"("Rockstar"."Age" > $1)"#);
        assert_eq!(sql.params, vec![int(42)]);

        let sql = common::test_condition(
            QueryRequest::new("QueryRockstarsConventions").field("AgeGreaterThanOrEqualTo", 42),
        )
        .await
        .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"("Rockstar"."Age" >= $1)"#);
    }

    #[tokio::test]
    async fn prefix_conventions() {
        let sql = common::test_condition(
            QueryRequest::new("QueryRockstarsConventions").field("GreaterThanAge", 42),
        )
        .await
        .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"("Rockstar"."Age" > $1)"#);
    }

    #[tokio::test]
    async fn starts_with_ignores_case() {
        let sql = common::test_condition(
            QueryRequest::new("QueryRockstarsConventions").field("FirstNameStartsWith", "Ji"),
        )
        .await
        .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"(UPPER("Rockstar"."FirstName") LIKE UPPER($1))"#);
        assert_eq!(sql.params, vec![text("Ji%")]);
    }

    #[tokio::test]
    async fn glued_operators() {
        let sql = common::test_condition(QueryRequest::new("QueryRockstars").param(">Age", "42"))
            .await
            .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"("Rockstar"."Age" >= $1)"#);
        assert_eq!(sql.params, vec![int(42)]);

        let sql = common::test_condition(QueryRequest::new("QueryRockstars").param("Age<", "42"))
            .await
            .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"("Rockstar"."Age" <= $1)"#);
    }

    #[tokio::test]
    async fn plural_parameters_compare_with_in() {
        let sql = common::test_condition(
            QueryRequest::new("QueryGetRockstarsDynamic").param("Ids", "1, 2,3"),
        )
        .await
        .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"("Rockstar"."Id" IN ($1, $2, $3))"#);
        assert_eq!(sql.params, vec![int(1), int(2), int(3)]);
    }

    #[tokio::test]
    async fn between_takes_two_values() {
        let sql = common::test_condition(
            QueryRequest::new("QueryGetRockstarsDynamic").param("IdsBetween", "2,4"),
        )
        .await
        .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"("Rockstar"."Id" BETWEEN $1 AND $2)"#);
        assert_eq!(sql.params, vec![int(2), int(4)]);

        let result = common::translate(
            QueryRequest::new("QueryGetRockstarsDynamic").param("IdsBetween", "2"),
        )
        .await
        .unwrap();
        assert_eq!(
            result.err(),
            Some(Error::InvalidBetweenValue {
                column: "Id".to_string(),
                found: 1
            })
        );
    }

    #[tokio::test]
    async fn field_directive_with_template_and_format() {
        let sql = common::test_condition(
            QueryRequest::new("QueryFieldRockstars").field("LastNameEndsWith", "drix"),
        )
        .await
        .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"("Rockstar"."LastName" LIKE $1)"#);
        assert_eq!(sql.params, vec![text("%drix")]);
    }

    #[tokio::test]
    async fn quotes_are_bound_not_interpolated() {
        let sql = common::test_condition(
            QueryRequest::new("QueryRockstars").param("FirstName", "Jim'\""),
        )
        .await
        .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"("Rockstar"."FirstName" = $1)"#);
        assert_eq!(sql.params, vec![text("Jim'\"")]);
    }

    #[tokio::test]
    async fn unknown_fields_are_ignored() {
        let sql = common::test_condition(
            QueryRequest::new("QueryUnknownRockstars")
                .field("UnknownInt", 42)
                .field("UnknownProperty", "Foo")
                .param("NoSuchParameter", "1"),
        )
        .await
        .unwrap();
        assert_eq!(sql.sql, "true");
        assert!(sql.params.is_empty());
    }

    #[tokio::test]
    async fn convention_keywords_match_exactly() {
        let sql = common::test_condition(QueryRequest::from_params(
            "QueryRockstars",
            [("ageGreaterThan", "42"), ("LastNameSTARTSWITH", "C")],
        ))
        .await
        .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"("Rockstar"."Age" > $1)"#);
        assert_eq!(sql.params, vec![int(42)]);
    }

    #[tokio::test]
    async fn empty_values_add_no_condition() {
        let sql = common::test_condition(QueryRequest::from_params(
            "QueryRockstars",
            [("Age", ""), ("Ids", ","), ("FirstNameStartsWith", " ")],
        ))
        .await
        .unwrap();
        insta::assert_snapshot!(sql.sql, @"true");
        assert!(sql.params.is_empty());
    }

    #[tokio::test]
    async fn every_default_template_parses() {
        for operator in enum_iterator::all::<Operator>() {
            assert!(
                Template::parse(operator.default_template()).is_ok(),
                "{operator:?}"
            );
        }
    }
}

mod terms {
    use super::*;

    #[tokio::test]
    async fn or_descriptors_combine_fields_with_or() {
        let sql = common::test_condition(
            QueryRequest::new("QueryOrRockstars")
                .field("Age", 42)
                .field("FirstName", "Jim"),
        )
        .await
        .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"(("Rockstar"."Age" = $1) OR ("Rockstar"."FirstName" = $2))"#);
        assert_eq!(sql.params, vec![int(42), text("Jim")]);
    }

    #[tokio::test]
    async fn overriding_fields_form_their_own_group() {
        let sql = common::test_condition(
            QueryRequest::new("QueryFieldRockstars")
                .field("FirstName", "Jimi")
                .field("Age", 42)
                .field("OrLastName", "Cobain"),
        )
        .await
        .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"((("Rockstar"."FirstName" = $1) AND ("Rockstar"."Age" >= $2)) OR (UPPER("Rockstar"."LastName") LIKE UPPER($3)))"#);
        assert_eq!(sql.params, vec![text("Jimi"), int(42), text("Cobain")]);
    }

    #[tokio::test]
    async fn several_overriding_fields_share_one_group() {
        let sql = common::test_condition(
            QueryRequest::new("QueryOrOverrideRockstars")
                .field("FirstName", "Kurt")
                .field("LastName", "Cobain")
                .field("OrLastName", "hendrix")
                .field("OrAge", 48),
        )
        .await
        .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"((("Rockstar"."FirstName" = $1) AND ("Rockstar"."LastName" = $2)) OR ((UPPER("Rockstar"."LastName") LIKE UPPER($3)) OR ("Rockstar"."Age" >= $4)))"#);
        assert_eq!(
            sql.params,
            vec![text("Kurt"), text("Cobain"), text("hendrix"), int(48)]
        );
    }

    #[tokio::test]
    async fn overriding_fields_alone() {
        let sql = common::test_condition(
            QueryRequest::new("QueryOrOverrideRockstars")
                .field("OrLastName", "hendrix")
                .field("OrAge", 48),
        )
        .await
        .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"((UPPER("Rockstar"."LastName") LIKE UPPER($1)) OR ("Rockstar"."Age" >= $2))"#);
    }
}

mod joins {
    use super::*;

    #[tokio::test]
    async fn inner_join_with_qualified_field() {
        let sql = common::test_translation(
            QueryRequest::new("QueryRockstarAlbums").field("RockstarAlbumName", "Nevermind"),
        )
        .await
        .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"SELECT "Rockstar"."Id" AS "Id", "Rockstar"."FirstName" AS "FirstName", "Rockstar"."LastName" AS "LastName", "Rockstar"."Age" AS "Age", "Rockstar"."DateOfBirth" AS "DateOfBirth", "Rockstar"."DateDied" AS "DateDied", "Rockstar"."LivingStatus" AS "LivingStatus" FROM "main"."Rockstar" AS "Rockstar" INNER JOIN "main"."RockstarAlbum" AS "RockstarAlbum" ON ("RockstarAlbum"."RockstarId" = "Rockstar"."Id") WHERE ("RockstarAlbum"."Name" = $1) LIMIT 100"#);
        assert_eq!(sql.params, vec![text("Nevermind")]);
    }

    #[tokio::test]
    async fn left_join_into_a_projection() {
        let sql = common::test_translation(QueryRequest::new("QueryRockstarAlbumsLeftJoin"))
            .await
            .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"SELECT "Rockstar"."FirstName" AS "FirstName", "Rockstar"."LastName" AS "LastName", "Rockstar"."Age" AS "Age", "RockstarAlbum"."Name" AS "RockstarAlbumName" FROM "main"."Rockstar" AS "Rockstar" LEFT OUTER JOIN "main"."RockstarAlbum" AS "RockstarAlbum" ON ("RockstarAlbum"."RockstarId" = "Rockstar"."Id") LIMIT 100"#);

        let plan = common::translate(QueryRequest::new("QueryRockstarAlbumsLeftJoin"))
            .await
            .unwrap()
            .unwrap()
            .plan;
        assert_eq!(
            plan.shape,
            vec![
                "FirstName",
                "LastName",
                "Age",
                "RockstarAlbumName",
                "RockstarGenreName"
            ]
        );
    }
}

mod paging {
    use super::*;

    #[tokio::test]
    async fn paging_orders_by_primary_key() {
        let sql = common::test_translation(
            QueryRequest::new("QueryRockstars")
                .field("Age", 27)
                .skip(1)
                .take(2),
        )
        .await
        .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"SELECT "Rockstar"."Id" AS "Id", "Rockstar"."FirstName" AS "FirstName", "Rockstar"."LastName" AS "LastName", "Rockstar"."Age" AS "Age", "Rockstar"."DateOfBirth" AS "DateOfBirth", "Rockstar"."DateDied" AS "DateDied", "Rockstar"."LivingStatus" AS "LivingStatus" FROM "main"."Rockstar" AS "Rockstar" WHERE ("Rockstar"."Age" = $1) ORDER BY "Rockstar"."Id" ASC LIMIT 2 OFFSET 1"#);
    }

    #[tokio::test]
    async fn paging_parameters_are_bound() {
        let query = common::translate(QueryRequest::from_params(
            "QueryRockstars",
            [("Skip", "1"), ("TAKE", "500")],
        ))
        .await
        .unwrap()
        .unwrap();
        assert_eq!(query.plan.offset(), 1);
        assert_eq!(query.plan.limit(), Some(100));

        let result = common::translate(QueryRequest::from_params(
            "QueryRockstars",
            [("take", "many")],
        ))
        .await
        .unwrap();
        assert_eq!(
            result.err(),
            Some(Error::InvalidParameter {
                name: "take".to_string(),
                value: "many".to_string()
            })
        );
    }

    #[tokio::test]
    async fn order_by_flips_prefixed_keys() {
        let query = common::translate(
            QueryRequest::new("SearchMovies")
                .order_by("Rating,-ImdbId")
                .take(100),
        )
        .await
        .unwrap()
        .unwrap();
        let mut sql = query_engine_sql::sql::string::SQL::new();
        query.plan.rows_select().order_by.to_sql(&mut sql);
        insta::assert_snapshot!(sql.sql, @r#" ORDER BY "Movie"."Rating" ASC, "Movie"."ImdbId" DESC"#);

        let query = common::translate(QueryRequest::new("SearchMovies").order_by_desc("Rating,-ImdbId"))
            .await
            .unwrap()
            .unwrap();
        let mut sql = query_engine_sql::sql::string::SQL::new();
        query.plan.rows_select().order_by.to_sql(&mut sql);
        insta::assert_snapshot!(sql.sql, @r#" ORDER BY "Movie"."Rating" DESC, "Movie"."ImdbId" ASC"#);
    }

    #[tokio::test]
    async fn count_ignores_paging() {
        let query = common::translate(QueryRequest::new("QueryRockstars").field("Age", 27).take(1))
            .await
            .unwrap()
            .unwrap();
        let sql = query.plan.count_sql();
        insta::assert_snapshot!(sql.sql, @r#"SELECT COUNT(*) AS "count" FROM "main"."Rockstar" AS "Rockstar" WHERE ("Rockstar"."Age" = $1)"#);
        assert_eq!(sql.params, vec![int(27)]);
    }
}

mod raw_sql {
    use super::*;

    #[tokio::test]
    async fn raw_where_is_anded() {
        let sql = common::test_condition(
            QueryRequest::new("QueryRockstars")
                .field("Age", 27)
                .param("_where", "\"LastName\" <> 'Cobain'"),
        )
        .await
        .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"(("Rockstar"."Age" = $1) AND ("LastName" <> 'Cobain'))"#);
    }

    #[tokio::test]
    async fn raw_select_replaces_the_select_list() {
        let sql = common::test_translation(
            QueryRequest::new("QueryRockstars")
                .param("_select", "\"FirstName\"")
                .param("_orderBy", "\"FirstName\" DESC"),
        )
        .await
        .unwrap();
        insta::assert_snapshot!(sql.sql, @r#"SELECT "FirstName" FROM "main"."Rockstar" AS "Rockstar" ORDER BY "FirstName" DESC LIMIT 100"#);
    }

    #[tokio::test]
    async fn raw_sql_is_rejected_when_disabled() {
        let configuration = common::configuration().await.unwrap();
        let result = query::translate(
            &configuration.metadata,
            &QuerySettings::default(),
            &QueryRequest::new("QueryRockstars").param("_where", "1 = 1"),
        );
        assert_eq!(
            result.err(),
            Some(Error::RawSqlFiltersDisabled("_where".to_string()))
        );
    }
}

mod aggregates {
    use super::*;

    #[tokio::test]
    async fn builtins_run_in_one_query_and_the_rest_is_left_for_hooks() {
        let query = common::translate(
            QueryRequest::new("QueryRockstars")
                .include("COUNT(*), MIN(Age), Bar('a') alias, Baz(1,'foo')"),
        )
        .await
        .unwrap()
        .unwrap();

        let labels: Vec<_> = query
            .plan
            .aggregates
            .iter()
            .map(|aggregate| aggregate.label.as_str())
            .collect();
        assert_eq!(labels, vec!["COUNT(*)", "MIN(Age)"]);

        let commands: Vec<_> = query.commands.iter().map(|command| command.label()).collect();
        assert_eq!(commands, vec!["alias", "Baz(1,'foo')"]);

        let sql = query.plan.aggregates_sql().unwrap();
        insta::assert_snapshot!(sql.sql, @r#"SELECT COUNT(*) AS "aggregate_0", MIN("Rockstar"."Age") AS "aggregate_1" FROM "main"."Rockstar" AS "Rockstar""#);
    }

    #[tokio::test]
    async fn aggregates_over_unknown_columns_are_not_builtins() {
        let query = common::translate(QueryRequest::new("QueryRockstars").include("MAX(Salary)"))
            .await
            .unwrap()
            .unwrap();
        assert!(query.plan.aggregates.is_empty());
        assert_eq!(query.commands.len(), 1);
    }
}

mod errors {
    use super::*;

    #[tokio::test]
    async fn unknown_descriptor() {
        let result = common::translate(QueryRequest::new("QueryNothing")).await.unwrap();
        assert_eq!(
            result.err(),
            Some(Error::DescriptorNotFound("QueryNothing".to_string()))
        );
    }

    #[tokio::test]
    async fn unconvertible_values() {
        let result = common::translate(QueryRequest::from_params(
            "QueryRockstars",
            [("Age", "forty")],
        ))
        .await
        .unwrap();
        let error = result.err().unwrap();
        assert!(error.is_invalid_request());
        assert_eq!(
            error,
            Error::InvalidValue {
                value: serde_json::json!("forty"),
                expected: ScalarType::Integer
            }
        );
    }
}

mod references {
    use super::*;

    #[tokio::test]
    async fn references_extend_the_shape() {
        let query = common::translate(QueryRequest::new("QueryRockstarsWithReferences"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            query.plan.shape,
            vec!["Id", "FirstName", "LastName", "Age", "Albums"]
        );
        let [reference] = query.plan.references.as_slice() else {
            panic!("expected one reference, got {:?}", query.plan.references);
        };
        assert_eq!(reference.key_property, "Id");
        assert_eq!(reference.foreign_key_property, "RockstarId");

        let sql = reference.query_sql(vec![
            query_engine_sql::sql::ast::Value::Int8(1),
            query_engine_sql::sql::ast::Value::Int8(3),
        ]);
        insta::assert_snapshot!(sql.sql, @r#"SELECT "RockstarAlbum"."Id" AS "Id", "RockstarAlbum"."RockstarId" AS "RockstarId", "RockstarAlbum"."Name" AS "Name" FROM "main"."RockstarAlbum" AS "RockstarAlbum" WHERE ("RockstarAlbum"."RockstarId" IN ($1, $2)) ORDER BY "RockstarAlbum"."Id" ASC"#);
    }
}

mod interception {
    use super::*;

    #[tokio::test]
    async fn conditions_can_be_added_after_translation() {
        let mut query = common::translate(QueryRequest::new("QueryRockstars").field("Age", 27))
            .await
            .unwrap()
            .unwrap();
        query
            .and_condition("LastName", Operator::In, serde_json::json!(["Cobain", "Vedder"]))
            .unwrap();
        query.set_take(Some(1));

        let sql = query.plan.query_sql();
        insta::assert_snapshot!(sql.sql, @r#"SELECT "Rockstar"."Id" AS "Id", "Rockstar"."FirstName" AS "FirstName", "Rockstar"."LastName" AS "LastName", "Rockstar"."Age" AS "Age", "Rockstar"."DateOfBirth" AS "DateOfBirth", "Rockstar"."DateDied" AS "DateDied", "Rockstar"."LivingStatus" AS "LivingStatus" FROM "main"."Rockstar" AS "Rockstar" WHERE (("Rockstar"."Age" = $1) AND ("Rockstar"."LastName" IN ($2, $3))) ORDER BY "Rockstar"."Id" ASC LIMIT 1"#);
        assert_eq!(sql.params, vec![int(27), text("Cobain"), text("Vedder")]);
    }
}
