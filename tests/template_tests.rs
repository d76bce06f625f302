// Copyright (c) 2025 - Cowboy AI, Inc.
//! Template Synthesis Tests
//!
//! Tests verify the synthesized template of both blueprints:
//! - Provider resources emitted per entity
//! - Property values derived from the default configuration
//! - Cross-resource references by logical id
//! - Stable output across synthesis runs

mod fixtures;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use cim_cloud_stack::resources::bucket::AUTO_DELETE_SERVICE_TOKEN;
use cim_cloud_stack::stack::template::TEMPLATE_FORMAT_VERSION;
use cim_cloud_stack::stack::CloudAssembly;

use fixtures::*;

const AL2_PARAMETER: &str = "AwsServiceAmiAmazonLinuxLatestAmzn2AmiHvmX8664Gp2Parameter";

fn backend_assembly() -> CloudAssembly {
    backend_api().stack().synthesize().expect("Failed to synthesize")
}

fn bucket_assembly() -> CloudAssembly {
    instance_bucket().stack().synthesize().expect("Failed to synthesize")
}

fn resource<'a>(assembly: &'a CloudAssembly, logical_id: &str) -> &'a Value {
    assembly
        .template_resource(logical_id)
        .unwrap_or_else(|| panic!("{logical_id} missing from template"))
}

#[test]
fn test_backend_api_resource_inventory() {
    let assembly = backend_assembly();

    assert_eq!(assembly.template()["AWSTemplateFormatVersion"], TEMPLATE_FORMAT_VERSION);
    assert_eq!(assembly.template_resource_count(), 15);
    assert_eq!(assembly.template_resources_of_type("AWS::EC2::VPC"), vec!["BackendApiVpc"]);
    assert_eq!(assembly.template_resources_of_type("AWS::EC2::Subnet").len(), 2);
    assert_eq!(assembly.template_resources_of_type("AWS::EC2::Route").len(), 2);
    assert!(assembly.template_resources_of_type("AWS::EC2::NatGateway").is_empty());
    assert!(assembly.template_resources_of_type("AWS::S3::Bucket").is_empty());
}

#[test]
fn test_backend_api_security_group_rules() {
    let assembly = backend_assembly();
    let sg = resource(&assembly, "BackendApiSecurityGroup");

    assert_eq!(sg["Properties"]["GroupName"], "backend-api-security-group");
    assert_eq!(sg["Properties"]["VpcId"], json!({ "Ref": "BackendApiVpc" }));
    assert_eq!(
        sg["Properties"]["SecurityGroupIngress"],
        json!([
            {
                "CidrIp": "0.0.0.0/0",
                "Description": "allow SSH access from anywhere",
                "FromPort": 22,
                "IpProtocol": "tcp",
                "ToPort": 22
            },
            {
                "CidrIp": "0.0.0.0/0",
                "Description": "allow HTTP traffic from anywhere",
                "FromPort": 80,
                "IpProtocol": "tcp",
                "ToPort": 80
            },
            {
                "CidrIp": "0.0.0.0/0",
                "Description": "allow HTTPS traffic from anywhere",
                "FromPort": 443,
                "IpProtocol": "tcp",
                "ToPort": 443
            }
        ])
    );
    assert_eq!(sg["Properties"]["SecurityGroupEgress"][0]["IpProtocol"], "-1");
}

#[test]
fn test_backend_api_instance_and_role() {
    let assembly = backend_assembly();
    let instance = resource(&assembly, "BackendApiEc2Instance");

    assert_eq!(instance["Type"], "AWS::EC2::Instance");
    assert_eq!(instance["DependsOn"], json!(["BackendApiRole"]));
    assert_eq!(instance["Properties"]["InstanceType"], "t2.micro");
    assert_eq!(instance["Properties"]["KeyName"], "backend-api-ec2-key-pair");
    assert_eq!(instance["Properties"]["ImageId"], json!({ "Ref": AL2_PARAMETER }));
    assert_eq!(
        instance["Properties"]["SubnetId"],
        json!({ "Ref": "BackendApiVpcPublicSubnet1" })
    );
    assert_eq!(
        instance["Properties"]["IamInstanceProfile"],
        json!({ "Ref": "BackendApiEc2InstanceInstanceProfile" })
    );

    let profile = resource(&assembly, "BackendApiEc2InstanceInstanceProfile");
    assert_eq!(profile["Properties"]["Roles"], json!([{ "Ref": "BackendApiRole" }]));

    assert_eq!(
        assembly.template()["Parameters"][AL2_PARAMETER],
        json!({
            "Type": "AWS::SSM::Parameter::Value<AWS::EC2::Image::Id>",
            "Default": "/aws/service/ami-amazon-linux-latest/amzn2-ami-hvm-x86_64-gp2"
        })
    );

    let role = resource(&assembly, "BackendApiRole");
    assert_eq!(role["Properties"]["RoleName"], "backend-api-role");
    assert_eq!(
        role["Properties"]["AssumeRolePolicyDocument"]["Statement"][0]["Principal"],
        json!({ "Service": "ec2.amazonaws.com" })
    );
    assert_eq!(
        role["Properties"]["ManagedPolicyArns"],
        json!([{
            "Fn::Join": ["", [
                "arn:",
                { "Ref": "AWS::Partition" },
                ":iam::aws:policy/",
                "AmazonS3ReadOnlyAccess"
            ]]
        }])
    );
}

#[test]
fn test_public_subnet_routes_through_internet_gateway() {
    let assembly = backend_assembly();
    let route = resource(&assembly, "BackendApiVpcPublicSubnet1DefaultRoute");

    assert_eq!(
        route,
        &json!({
            "Type": "AWS::EC2::Route",
            "Properties": {
                "RouteTableId": { "Ref": "BackendApiVpcPublicSubnet1RouteTable" },
                "DestinationCidrBlock": "0.0.0.0/0",
                "GatewayId": { "Ref": "BackendApiVpcIgw" }
            },
            "DependsOn": ["BackendApiVpcVpcgw"]
        })
    );
    assert_eq!(
        resource(&assembly, "BackendApiVpcPublicSubnet2")["Properties"]["CidrBlock"],
        "10.0.1.0/24"
    );
}

#[test]
fn test_instance_bucket_resource_inventory() {
    let assembly = bucket_assembly();

    // VPC 3, public subnets 2x4, isolated subnets 2x3, SG, instance,
    // bucket, auto-delete handler, bucket policy
    assert_eq!(assembly.template_resource_count(), 22);
    assert!(assembly.template_resources_of_type("AWS::IAM::InstanceProfile").is_empty());
    assert_eq!(
        assembly.template_resources_of_type("AWS::S3::BucketPolicy"),
        vec!["TestBucketPolicy"]
    );

    let instance = resource(&assembly, "TestEc2Instance");
    assert_eq!(
        instance["Properties"]["SubnetId"],
        json!({ "Ref": "TestVpcIsolatedSubnet1" })
    );
    assert!(instance["Properties"].get("KeyName").is_none());
    assert_eq!(
        resource(&assembly, "TestSecurityGroup")["Properties"]["SecurityGroupIngress"],
        json!([])
    );
}

#[test]
fn test_bucket_properties() {
    let assembly = bucket_assembly();
    let bucket = resource(&assembly, "TestBucket");

    assert_eq!(
        bucket,
        &json!({
            "Type": "AWS::S3::Bucket",
            "Properties": {
                "BucketName": "test-bucket",
                "BucketEncryption": {
                    "ServerSideEncryptionConfiguration": [{
                        "ServerSideEncryptionByDefault": { "SSEAlgorithm": "AES256" }
                    }]
                },
                "CorsConfiguration": {
                    "CorsRules": [{
                        "AllowedMethods": ["GET", "POST", "PUT"],
                        "AllowedOrigins": ["http://localhost:6000"],
                        "AllowedHeaders": ["*"]
                    }]
                },
                "LifecycleConfiguration": {
                    "Rules": [{
                        "Status": "Enabled",
                        "Transitions": [{ "StorageClass": "STANDARD_IA", "TransitionInDays": 30 }]
                    }]
                },
                "PublicAccessBlockConfiguration": {
                    "BlockPublicAcls": true,
                    "BlockPublicPolicy": true,
                    "IgnorePublicAcls": true,
                    "RestrictPublicBuckets": true
                },
                "Tags": [{ "Key": "cim:auto-delete-objects", "Value": "true" }]
            },
            "UpdateReplacePolicy": "Delete",
            "DeletionPolicy": "Delete"
        })
    );
}

#[test]
fn test_bucket_policy_statements() {
    let assembly = bucket_assembly();
    let policy = resource(&assembly, "TestBucketPolicy");

    assert_eq!(policy["Properties"]["Bucket"], json!({ "Ref": "TestBucket" }));
    assert_eq!(
        policy["Properties"]["PolicyDocument"],
        json!({
            "Statement": [
                {
                    "Sid": "ObjectAccess",
                    "Effect": "Allow",
                    "Principal": { "Service": "ec2.amazonaws.com" },
                    "Action": ["s3:GetObject", "s3:PutObject", "s3:DeleteObject"],
                    "Resource": {
                        "Fn::Join": ["", [{ "Fn::GetAtt": ["TestBucket", "Arn"] }, "/*"]]
                    }
                },
                {
                    "Sid": "ListObjects",
                    "Effect": "Allow",
                    "Principal": { "Service": "ec2.amazonaws.com" },
                    "Action": "s3:ListBucket",
                    "Resource": { "Fn::GetAtt": ["TestBucket", "Arn"] }
                }
            ],
            "Version": "2012-10-17"
        })
    );
}

#[test]
fn test_auto_delete_handler() {
    let assembly = bucket_assembly();
    let handler = resource(&assembly, "TestBucketAutoDeleteObjects");

    assert_eq!(handler["Type"], "Custom::S3AutoDeleteObjects");
    assert_eq!(handler["DependsOn"], json!(["TestBucketPolicy"]));
    assert_eq!(
        handler["Properties"]["ServiceToken"],
        json!({ "Ref": AUTO_DELETE_SERVICE_TOKEN })
    );
    assert_eq!(handler["Properties"]["DeleteAllVersions"], true);
    assert_eq!(
        assembly.template()["Parameters"][AUTO_DELETE_SERVICE_TOKEN]["Type"],
        "String"
    );
}

#[test]
fn test_template_is_stable_across_runs() {
    let first = bucket_assembly().to_json_pretty().unwrap();
    let second = bucket_assembly().to_json_pretty().unwrap();

    assert_eq!(first, second);
    let parsed: Value = serde_json::from_str(&first).unwrap();
    assert_eq!(parsed["Description"], "Instance with an object bucket");
}
