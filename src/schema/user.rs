//! The `system_user` table: account credentials plus profile, contact,
//! location, and third-party token columns.

use crate::schema::audit::audit_columns;
use crate::schema::def::{ColumnDef, ColumnType, TableDef};

pub fn system_user() -> TableDef {
    TableDef::new("system_user")
        .comment("registered account with profile data")
        .columns(audit_columns())
        .column(
            ColumnDef::new("username", ColumnType::Varchar(60))
                .not_null()
                .unique()
                .comment("user provided unique name"),
        )
        .column(
            ColumnDef::new("password", ColumnType::Varchar(255))
                .not_null()
                .comment("user provided password with cryption"),
        )
        .column(
            ColumnDef::new("mobile", ColumnType::Varchar(20)).comment("mobile no provided by user"),
        )
        .column(
            ColumnDef::new("telno", ColumnType::Varchar(40)).comment("tel no provided by user"),
        )
        .column(
            ColumnDef::new("email", ColumnType::Varchar(60))
                .comment("email address provided by user"),
        )
        .column(ColumnDef::new("gender", ColumnType::Integer).comment("gender/sex"))
        .column(ColumnDef::new("birth", ColumnType::Timestamp).comment("user birth date"))
        .column(ColumnDef::new("avatar", ColumnType::Varchar(255)).comment("user logo image url"))
        .column(ColumnDef::new("lang", ColumnType::Varchar(20)).comment("user language setting"))
        .column(
            ColumnDef::new("verify_type", ColumnType::Varchar(20))
                .comment("user info verify type"),
        )
        .column(ColumnDef::new("nickname", ColumnType::Varchar(60)).comment("user nick name"))
        .column(ColumnDef::new("user_tag", ColumnType::Varchar(20)).comment("user tag"))
        .column(ColumnDef::new("last_login_ip", ColumnType::Varchar(20)))
        .column(ColumnDef::new("last_login_time", ColumnType::Timestamp))
        .column(ColumnDef::new("last_login_device", ColumnType::Varchar(50)))
        .column(ColumnDef::new("first_name", ColumnType::Varchar(50)).comment("first name"))
        .column(ColumnDef::new("last_name", ColumnType::Varchar(50)).comment("last name"))
        .column(
            ColumnDef::new("govtid_type", ColumnType::Integer)
                .comment("government identity type"),
        )
        .column(
            ColumnDef::new("govtid", ColumnType::Varchar(50)).comment("government identity no"),
        )
        .column(ColumnDef::new("profession", ColumnType::Varchar(50)))
        .column(ColumnDef::new("profile", ColumnType::Varchar(255)).comment("self introduction"))
        .column(
            ColumnDef::new("department", ColumnType::Varchar(255))
                .comment("belonging department description"),
        )
        .column(
            ColumnDef::new("organization", ColumnType::Varchar(255))
                .comment("belonging organization description"),
        )
        .column(ColumnDef::new("home_address", ColumnType::Varchar(255)))
        .column(ColumnDef::new("office_address", ColumnType::Varchar(255)))
        .column(
            ColumnDef::new("location_lng", ColumnType::Double)
                .comment("longitude value of GPS"),
        )
        .column(
            ColumnDef::new("location_lat", ColumnType::Double).comment("latitude value of GPS"),
        )
        .column(ColumnDef::new("social_token", ColumnType::Varchar(255)).comment("oauth token"))
        .column(
            ColumnDef::new("im_token", ColumnType::Varchar(255))
                .comment("im saas services token"),
        )
        .column(
            ColumnDef::new("class_token", ColumnType::Varchar(255))
                .comment("class-room services user token"),
        )
}
