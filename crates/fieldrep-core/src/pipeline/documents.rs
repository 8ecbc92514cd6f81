//! GraphQL documents sent by the client.

/// A named GraphQL query or mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Document {
    /// Operation name, used in logs.
    pub operation: &'static str,
    /// Full document text.
    pub text: &'static str,
}

pub const LOGIN: Document = Document {
    operation: "Login",
    text: "mutation Login($email: String!, $password: String!) {
  login(email: $email, password: $password) {
    token
    companyId
  }
}",
};

pub const WORKING_AREAS: Document = Document {
    operation: "WorkingAreas",
    text: "query WorkingAreas {
  myWorkingAreas {
    id
    state
    city
    district
    label
  }
}",
};

pub const WORKING_AREA_RELATIONS: Document = Document {
    operation: "WorkingAreaRelations",
    text: "query WorkingAreaRelations($workingAreaId: ID!) {
  workingAreaRelations(workingAreaId: $workingAreaId) {
    doctors {
      id
      doctor { name title phone profileImageUrl specialty }
    }
    chemists {
      id
      chemist { name title phone profileImageUrl shopName }
    }
  }
}",
};

pub const SEARCH_PEOPLE: Document = Document {
    operation: "SearchPeople",
    text: "query SearchPeople($search: String!) {
  searchPeople(search: $search) {
    doctors { id name title phone profileImageUrl specialty }
    chemists { id name title phone profileImageUrl shopName }
  }
}",
};

pub const PRODUCTS: Document = Document {
    operation: "Products",
    text: "query Products($page: Int!, $first: Int!) {
  products(page: $page, first: $first) {
    paginatorInfo { currentPage lastPage }
    data { id name code price }
  }
}",
};

pub const CREATE_DAILY_PLAN: Document = Document {
    operation: "CreateDailyPlan",
    text: "mutation CreateDailyPlan($input: CreateDailyPlanInput!) {
  createDailyPlan(input: $input) {
    id
    planDate
  }
}",
};

pub const CREATE_SALE: Document = Document {
    operation: "CreateSale",
    text: "mutation CreateSale($input: CreateSaleInput!) {
  createSale(input: $input) {
    id
    total
  }
}",
};
