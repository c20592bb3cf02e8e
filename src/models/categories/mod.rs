pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{Category, Group, GroupMembership};
pub use requests::{AddMemberRequest, CreateCategoryRequest, ManualGroupRequest, MoveMemberRequest};
pub use responses::{
    CategoryListResponse, GroupListResponse, StudentGroupResponse, TeammatesResponse,
};
