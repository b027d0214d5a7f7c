//! The entity types a run can migrate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One migratable entity type, naming both its legacy and destination tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    HowHearAboutUsItem,
    Tag,
    ServiceFee,
    Comment,
    VehicleType,
    SkillSet,
    InsuranceRequirement,
    SkillSetInsuranceRequirement,
    BulletinBoardItem,
    Associate,
    Customer,
    Partner,
    Staff,
    OngoingWorkOrder,
    WorkOrder,
    TaskItem,
    WorkOrderDeposit,
    WorkOrderInvoice,
    AssociateAwayLog,
    ActivitySheetItem,
    AssociateTag,
    CustomerTag,
    WorkOrderTag,
    StaffTag,
    AssociateComment,
    CustomerComment,
    WorkOrderComment,
    StaffComment,
    PartnerComment,
    AssociateVehicleType,
    AssociateSkillSet,
    AssociateInsuranceRequirement,
    WorkOrderSkillSet,
    PrivateFile,
}

impl EntityKind {
    /// Every kind, in an order that migrates dependencies first.
    pub const ALL: [Self; 35] = [
        Self::User,
        Self::HowHearAboutUsItem,
        Self::Tag,
        Self::ServiceFee,
        Self::Comment,
        Self::VehicleType,
        Self::SkillSet,
        Self::InsuranceRequirement,
        Self::SkillSetInsuranceRequirement,
        Self::BulletinBoardItem,
        Self::Associate,
        Self::Customer,
        Self::Partner,
        Self::Staff,
        Self::OngoingWorkOrder,
        Self::WorkOrder,
        Self::TaskItem,
        Self::WorkOrderDeposit,
        Self::WorkOrderInvoice,
        Self::AssociateAwayLog,
        Self::ActivitySheetItem,
        Self::AssociateTag,
        Self::CustomerTag,
        Self::WorkOrderTag,
        Self::StaffTag,
        Self::AssociateComment,
        Self::CustomerComment,
        Self::WorkOrderComment,
        Self::StaffComment,
        Self::PartnerComment,
        Self::AssociateVehicleType,
        Self::AssociateSkillSet,
        Self::AssociateInsuranceRequirement,
        Self::WorkOrderSkillSet,
        Self::PrivateFile,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::HowHearAboutUsItem => "how_hear_about_us_item",
            Self::Tag => "tag",
            Self::ServiceFee => "service_fee",
            Self::Comment => "comment",
            Self::VehicleType => "vehicle_type",
            Self::SkillSet => "skill_set",
            Self::InsuranceRequirement => "insurance_requirement",
            Self::SkillSetInsuranceRequirement => "skill_set_insurance_requirement",
            Self::BulletinBoardItem => "bulletin_board_item",
            Self::Associate => "associate",
            Self::Customer => "customer",
            Self::Partner => "partner",
            Self::Staff => "staff",
            Self::OngoingWorkOrder => "ongoing_work_order",
            Self::WorkOrder => "work_order",
            Self::TaskItem => "task_item",
            Self::WorkOrderDeposit => "work_order_deposit",
            Self::WorkOrderInvoice => "work_order_invoice",
            Self::AssociateAwayLog => "associate_away_log",
            Self::ActivitySheetItem => "activity_sheet_item",
            Self::AssociateTag => "associate_tag",
            Self::CustomerTag => "customer_tag",
            Self::WorkOrderTag => "work_order_tag",
            Self::StaffTag => "staff_tag",
            Self::AssociateComment => "associate_comment",
            Self::CustomerComment => "customer_comment",
            Self::WorkOrderComment => "work_order_comment",
            Self::StaffComment => "staff_comment",
            Self::PartnerComment => "partner_comment",
            Self::AssociateVehicleType => "associate_vehicle_type",
            Self::AssociateSkillSet => "associate_skill_set",
            Self::AssociateInsuranceRequirement => "associate_insurance_requirement",
            Self::WorkOrderSkillSet => "work_order_skill_set",
            Self::PrivateFile => "private_file",
        }
    }

    /// Destination table holding rows of this kind.
    #[must_use]
    pub fn target_table(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::HowHearAboutUsItem => "how_hear_about_us_items",
            Self::Tag => "tags",
            Self::ServiceFee => "work_order_service_fees",
            Self::Comment => "comments",
            Self::VehicleType => "vehicle_types",
            Self::SkillSet => "skill_sets",
            Self::InsuranceRequirement => "insurance_requirements",
            Self::SkillSetInsuranceRequirement => "skill_set_insurance_requirements",
            Self::BulletinBoardItem => "bulletin_board_items",
            Self::Associate => "associates",
            Self::Customer => "customers",
            Self::Partner => "partners",
            Self::Staff => "staff",
            Self::OngoingWorkOrder => "ongoing_work_orders",
            Self::WorkOrder => "work_orders",
            Self::TaskItem => "task_items",
            Self::WorkOrderDeposit => "work_order_deposits",
            Self::WorkOrderInvoice => "work_order_invoices",
            Self::AssociateAwayLog => "associate_away_logs",
            Self::ActivitySheetItem => "activity_sheet_items",
            Self::AssociateTag => "associate_tags",
            Self::CustomerTag => "customer_tags",
            Self::WorkOrderTag => "work_order_tags",
            Self::StaffTag => "staff_tags",
            Self::AssociateComment => "associate_comments",
            Self::CustomerComment => "customer_comments",
            Self::WorkOrderComment => "work_order_comments",
            Self::StaffComment => "staff_comments",
            Self::PartnerComment => "partner_comments",
            Self::AssociateVehicleType => "associate_vehicle_types",
            Self::AssociateSkillSet => "associate_skill_sets",
            Self::AssociateInsuranceRequirement => "associate_insurance_requirements",
            Self::WorkOrderSkillSet => "work_order_skill_sets",
            Self::PrivateFile => "private_files",
        }
    }

    /// Legacy table rows of this kind are read from.
    #[must_use]
    pub fn legacy_table(self) -> &'static str {
        match self {
            Self::User => "workery_users",
            Self::HowHearAboutUsItem => "workery_how_hear_about_us_items",
            Self::Tag => "workery_tags",
            Self::ServiceFee => "workery_work_order_service_fees",
            Self::Comment => "workery_comments",
            Self::VehicleType => "workery_vehicle_types",
            Self::SkillSet => "workery_skill_sets",
            Self::InsuranceRequirement => "workery_insurance_requirements",
            Self::SkillSetInsuranceRequirement => "workery_skill_sets_insurance_requirements",
            Self::BulletinBoardItem => "workery_bulletin_board_items",
            Self::Associate => "workery_associates",
            Self::Customer => "workery_customers",
            Self::Partner => "workery_partners",
            Self::Staff => "workery_staff",
            Self::OngoingWorkOrder => "workery_ongoing_work_orders",
            Self::WorkOrder => "workery_work_orders",
            Self::TaskItem => "workery_task_items",
            Self::WorkOrderDeposit => "workery_work_order_deposits",
            Self::WorkOrderInvoice => "workery_work_order_invoices",
            Self::AssociateAwayLog => "workery_away_logs",
            Self::ActivitySheetItem => "workery_activity_sheet_items",
            Self::AssociateTag => "workery_associates_tags",
            Self::CustomerTag => "workery_customers_tags",
            Self::WorkOrderTag => "workery_work_orders_tags",
            Self::StaffTag => "workery_staff_tags",
            Self::AssociateComment => "workery_associate_comments",
            Self::CustomerComment => "workery_customer_comments",
            Self::WorkOrderComment => "workery_work_order_comments",
            Self::StaffComment => "workery_staff_comments",
            Self::PartnerComment => "workery_partner_comments",
            Self::AssociateVehicleType => "workery_associates_vehicle_types",
            Self::AssociateSkillSet => "workery_associates_skill_sets",
            Self::AssociateInsuranceRequirement => "workery_associates_insurance_requirements",
            Self::WorkOrderSkillSet => "workery_work_orders_skill_sets",
            Self::PrivateFile => "workery_private_file_uploads",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name that matches no [`EntityKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity kind '{0}'")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| UnknownEntityKind(s.to_owned()))
    }
}
