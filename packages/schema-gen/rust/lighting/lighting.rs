// @generated
// This file is @generated by prost-build.
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct GetHeadlightStateRequest {}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct GetHeadlightStateResponse {
    #[prost(bool, tag = "1")]
    pub is_on: bool,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct SetHeadlightRequest {
    #[prost(bool, tag = "1")]
    pub turn_on: bool,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct SetHeadlightResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
}
include!("lighting.tonic.rs");
// @@protoc_insertion_point(module)
